use std::path::{Path, PathBuf};
use std::sync::Arc;

use eframe::egui::{self, FontData, FontDefinitions, FontFamily};

/// System fonts with CJK coverage, tried in order.
const CJK_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Light.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

/// The configured font if it exists, else the first candidate on disk.
pub fn find_font(configured: Option<&Path>, candidates: &[&str]) -> Option<PathBuf> {
    configured
        .filter(|p| p.exists())
        .map(Path::to_path_buf)
        .or_else(|| {
            candidates
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists())
        })
}

/// Add a CJK-capable font as fallback for both families. Without one,
/// university names render as boxes, so say so in the log.
pub fn install_cjk_font(ctx: &egui::Context, configured: Option<&Path>) {
    if let Some(p) = configured.filter(|p| !p.exists()) {
        log::warn!("Configured font {} does not exist", p.display());
    }

    let Some(path) = find_font(configured, CJK_CANDIDATES) else {
        log::warn!("No CJK font found; set `font_path` in the config");
        return;
    };

    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("Skipping font {}: {e}", path.display());
            return;
        }
    };

    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk".to_owned(), Arc::new(FontData::from_owned(bytes)));
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("cjk".to_owned());
    }
    ctx.set_fonts(fonts);
    log::info!("Using font {}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_font_wins_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("f.ttf");
        std::fs::write(&font, b"x").unwrap();
        assert_eq!(find_font(Some(font.as_path()), &["/definitely/not/here.ttf"]), Some(font));
    }

    #[test]
    fn falls_back_to_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("cand.ttc");
        std::fs::write(&font, b"x").unwrap();
        let cand = font.to_str().unwrap();
        let missing = dir.path().join("missing.ttf");
        assert_eq!(find_font(Some(missing.as_path()), &[cand]), Some(font.clone()));
        assert_eq!(find_font(None, &["/nope.ttc"]), None);
    }
}
