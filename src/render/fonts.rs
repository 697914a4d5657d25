//! Font loading with silent fallback to the built-in bitmap font.
//!
//! Fonts are loaded once per run into [`LabelFonts`] and then shared by
//! every label. A missing file, an unknown family, or undecodable font data
//! never fails the run: the role simply renders with the bitmap font.

use std::fs;

use ab_glyph::{FontArc, FontVec};
use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight};

use super::text::LabelFont;
use crate::label::{FontSpec, LabelConfig};

/// The three typefaces a label uses.
#[derive(Debug, Clone)]
pub struct LabelFonts {
    pub header: LabelFont,
    pub name: LabelFont,
    pub location: LabelFont,
}

impl LabelFonts {
    /// Load all roles from `config`. System fonts are only scanned when a
    /// role asks for a family by name.
    pub fn load(config: &LabelConfig) -> Self {
        let specs = [
            &config.header_font,
            &config.name_font,
            &config.location_font,
        ];

        let mut db = Database::new();
        if specs.iter().any(|spec| spec.family.is_some()) {
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "Loaded system font database");
        }

        Self {
            header: load_font_or_default(&config.header_font, &db),
            name: load_font_or_default(&config.name_font, &db),
            location: load_font_or_default(&config.location_font, &db),
        }
    }

    /// Bitmap font for every role, at the sizes `config` requests.
    pub fn builtin(config: &LabelConfig) -> Self {
        Self {
            header: LabelFont::bitmap(config.header_font.size),
            name: LabelFont::bitmap(config.name_font.size),
            location: LabelFont::bitmap(config.location_font.size),
        }
    }
}

/// Load the face `spec` prefers, or the built-in bitmap font if it cannot be
/// found or decoded.
pub fn load_font_or_default(spec: &FontSpec, db: &Database) -> LabelFont {
    if let Some(font) = load_from_path(spec).or_else(|| load_from_family(spec, db)) {
        return LabelFont::outline(font, spec.size);
    }

    if spec.family.is_some() || spec.path.is_some() {
        tracing::debug!(
            family = ?spec.family,
            path = ?spec.path,
            "Preferred font unavailable, using built-in bitmap font"
        );
    }
    LabelFont::bitmap(spec.size)
}

fn load_from_path(spec: &FontSpec) -> Option<FontArc> {
    let path = spec.path.as_ref()?;
    match fs::read(path) {
        Ok(data) => match FontVec::try_from_vec(data) {
            Ok(font) => Some(FontArc::new(font)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Failed to decode font file");
                None
            }
        },
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Failed to read font file");
            None
        }
    }
}

fn load_from_family(spec: &FontSpec, db: &Database) -> Option<FontArc> {
    let family = spec.family.as_deref()?;
    let id = db.query(&Query {
        families: &[Family::Name(family)],
        weight: if spec.bold { Weight::BOLD } else { Weight::NORMAL },
        stretch: Stretch::Normal,
        style: Style::Normal,
    })?;
    let face = db.face(id)?;

    let data = match &face.source {
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        Source::File(path) => fs::read(path).ok()?,
        Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };

    FontVec::try_from_vec_and_index(data, face.index)
        .ok()
        .map(FontArc::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_builtin_spec_uses_bitmap() {
        let db = Database::new();
        let font = load_font_or_default(&FontSpec::builtin(48.0), &db);
        assert!(matches!(font, LabelFont::Bitmap { scale: 2 }));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let db = Database::new();
        let spec = FontSpec {
            family: None,
            path: Some(PathBuf::from("/nonexistent/arialbd.ttf")),
            bold: true,
            size: 56.0,
        };
        assert!(load_font_or_default(&spec, &db).is_bitmap());
    }

    #[test]
    fn test_garbage_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let spec = FontSpec {
            family: None,
            path: Some(path),
            bold: false,
            size: 46.0,
        };
        assert!(load_font_or_default(&spec, &Database::new()).is_bitmap());
    }

    #[test]
    fn test_unknown_family_falls_back() {
        // Empty database: no family can match
        let db = Database::new();
        let spec = FontSpec::family("No Such Family 9000", true, 46.0);
        assert!(load_font_or_default(&spec, &db).is_bitmap());
    }

    fn fixture_path() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/DejaVuSans.ttf"))
    }

    #[test]
    fn test_font_file_loads_as_outline() {
        let spec = FontSpec {
            family: None,
            path: Some(fixture_path()),
            bold: false,
            size: 46.0,
        };
        let font = load_font_or_default(&spec, &Database::new());
        assert!(!font.is_bitmap());
        assert!(font.bbox("Hg").height() > 0);
    }

    #[test]
    fn test_path_wins_over_unknown_family() {
        let spec = FontSpec {
            family: Some("No Such Family 9000".to_string()),
            path: Some(fixture_path()),
            bold: true,
            size: 56.0,
        };
        assert!(!load_font_or_default(&spec, &Database::new()).is_bitmap());
    }

    #[test]
    fn test_family_lookup_finds_face() {
        let mut db = Database::new();
        db.load_font_data(include_bytes!("../../tests/fonts/DejaVuSans.ttf").to_vec());

        let spec = FontSpec::family("DejaVu Sans", false, 46.0);
        let font = load_font_or_default(&spec, &db);
        assert!(!font.is_bitmap());

        let from_file = load_font_or_default(
            &FontSpec {
                family: None,
                path: Some(fixture_path()),
                bold: false,
                size: 46.0,
            },
            &db,
        );
        assert_eq!(font.bbox("Labstep"), from_file.bbox("Labstep"));
    }

    #[test]
    fn test_load_builtin_config() {
        let config = LabelConfig {
            header_font: FontSpec::builtin(46.0),
            name_font: FontSpec::builtin(56.0),
            location_font: FontSpec::builtin(72.0),
            ..Default::default()
        };
        let fonts = LabelFonts::load(&config);
        assert!(matches!(fonts.header, LabelFont::Bitmap { scale: 2 }));
        assert!(matches!(fonts.name, LabelFont::Bitmap { scale: 2 }));
        assert!(matches!(fonts.location, LabelFont::Bitmap { scale: 3 }));
    }
}
