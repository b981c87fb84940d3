// fonts.rs — fallback UI font for languages egui's bundled fonts do not cover

use std::path::{Path, PathBuf};

/// Languages whose glyphs are outside egui's default fonts.
fn needs_cjk(lang: &str) -> bool {
    matches!(lang.split('-').next(), Some("zh" | "ja" | "ko"))
}

fn candidates() -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();

    if cfg!(windows) {
        let dir = PathBuf::from(r"C:\Windows\Fonts");
        for f in ["msyh.ttf", "simhei.ttf", "Deng.ttf", "meiryo.ttf", "yumin.ttf", "malgun.ttf"] {
            out.push(dir.join(f));
        }
    } else if cfg!(target_os = "macos") {
        for f in [
            "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
            "/Library/Fonts/NotoSansSC-Regular.otf",
            "/Library/Fonts/NotoSansJP-Regular.otf",
            "/System/Library/Fonts/Hiragino Sans GB.ttc",
        ] {
            out.push(PathBuf::from(f));
        }
    } else if cfg!(unix) {
        for f in [
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/noto/NotoSansSC-Regular.ttf",
            "/usr/share/fonts/truetype/noto/NotoSansJP-Regular.ttf",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
        ] {
            out.push(PathBuf::from(f));
        }
    }

    // bundled next to the binary, then the working directory
    let bundled = ["NotoSansSC-Regular.otf", "NotoSansJP-Regular.otf", "NotoSansCJK-Regular.ttc"];
    let mut roots = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(dir.join("assets").join("fonts"));
    }
    roots.push(PathBuf::from("assets").join("fonts"));
    for root in roots {
        out.extend(bundled.iter().map(|f| root.join(f)));
    }
    out
}

/// Reads `path` and keeps it only if ab_glyph can parse it (.ttc support is patchy).
fn load_font(path: &Path) -> Option<Vec<u8>> {
    let bytes = std::fs::read(path).ok()?;
    ab_glyph::FontRef::try_from_slice(&bytes).ok()?;
    Some(bytes)
}

/// Installs a fallback font for `lang`, or restores the defaults for Latin-script languages.
pub fn install_ui_font(ctx: &egui::Context, lang: &str) {
    let mut fonts = egui::FontDefinitions::default();

    if needs_cjk(lang) {
        match candidates().into_iter().find_map(|p| load_font(&p).map(|b| (p, b))) {
            Some((path, bytes)) => {
                log::info!(
                    "{}",
                    crate::i18n::tr_with("font.using", &[("path", path.display().to_string())])
                );
                fonts
                    .font_data
                    .insert("ui-fallback".to_owned(), egui::FontData::from_owned(bytes));
                for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                    if let Some(list) = fonts.families.get_mut(&family) {
                        list.push("ui-fallback".to_owned());
                    }
                }
            }
            None => log::warn!("{}", crate::i18n::tr("font.not_found")),
        }
    }

    ctx.set_fonts(fonts);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cjk_languages_need_a_fallback() {
        assert!(needs_cjk("zh-Hans"));
        assert!(needs_cjk("ja"));
        assert!(!needs_cjk("en"));
        assert!(!needs_cjk("fr"));
    }

    #[test]
    fn unreadable_files_are_skipped() {
        assert!(load_font(Path::new("/no/such/font.ttf")).is_none());
        assert!(!candidates().is_empty());
    }
}
