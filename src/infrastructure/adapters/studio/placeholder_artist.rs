//! Placeholder Artist - 生成占位 SVG 分格
//!
//! 不调用图像服务；把场景描述与对白排版进 SVG，base64 编码后返回

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::application::ports::{PanelArtPort, StudioError};
use crate::domain::Panel;

const CANVAS: u32 = 512;
const LINE_CHARS: usize = 36;
const MAX_LINES: usize = 12;

const PALETTE: [&str; 6] = [
    "#fde68a", "#bfdbfe", "#fecaca", "#bbf7d0", "#ddd6fe", "#fed7aa",
];

/// 占位分格绘制器
#[derive(Debug, Clone, Default)]
pub struct PlaceholderArtist;

impl PlaceholderArtist {
    pub fn new() -> Self {
        Self
    }

    /// 渲染 SVG 文本
    pub fn svg(panel: &Panel, character_profile: Option<&str>) -> String {
        let background = PALETTE[panel.order() % PALETTE.len()];

        let mut lines = wrap(panel.scene_description(), LINE_CHARS);
        if let Some(dialogue) = panel.dialogue() {
            lines.push(String::new());
            lines.extend(wrap(&format!("“{}”", dialogue), LINE_CHARS));
        }
        if let Some(profile) = character_profile {
            lines.push(String::new());
            lines.extend(wrap(profile, LINE_CHARS));
        }
        lines.truncate(MAX_LINES);

        let text: String = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                format!(
                    r##"<text x="32" y="{}" font-family="sans-serif" font-size="18" fill="#1f2937">{}</text>"##,
                    80 + i * 28,
                    escape_xml(line)
                )
            })
            .collect();

        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}"><rect width="100%" height="100%" fill="{bg}"/><rect x="12" y="12" width="{inner}" height="{inner}" fill="none" stroke="#111827" stroke-width="4"/><text x="32" y="44" font-family="sans-serif" font-size="14" fill="#6b7280">Panel {number}</text>{text}</svg>"##,
            size = CANVAS,
            inner = CANVAS - 24,
            bg = background,
            number = panel.order() + 1,
            text = text,
        )
    }
}

#[async_trait]
impl PanelArtPort for PlaceholderArtist {
    async fn render(
        &self,
        panel: &Panel,
        character_profile: Option<&str>,
    ) -> Result<String, StudioError> {
        let svg = Self::svg(panel, character_profile);
        tracing::debug!(panel_id = %panel.panel_id(), bytes = svg.len(), "Placeholder panel rendered");
        Ok(STANDARD.encode(svg.as_bytes()))
    }
}

/// 按单词折行；超长单词按字符截断
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if word.chars().count() > width {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = chunk.iter().collect();
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PanelId;

    fn panel(scene: &str) -> Panel {
        Panel::new(PanelId::new("p1").unwrap(), 0, scene).unwrap()
    }

    #[tokio::test]
    async fn test_render_returns_base64_svg() {
        let artist = PlaceholderArtist::new();
        let encoded = artist.render(&panel("A fox in the woods"), None).await.unwrap();

        let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(decoded.starts_with("<svg"));
        assert!(decoded.contains("A fox in the woods"));
    }

    #[test]
    fn test_scene_text_is_escaped() {
        let svg = PlaceholderArtist::svg(&panel("Tom & Jerry <run>"), None);
        assert!(svg.contains("Tom &amp; Jerry &lt;run&gt;"));
        assert!(!svg.contains("<run>"));
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("one two three four five six", 9);
        assert_eq!(lines, vec!["one two", "three", "four five", "six"]);
        assert!(wrap("abcdefghij", 4).iter().all(|l| l.chars().count() <= 4));
    }
}
