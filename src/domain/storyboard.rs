//! 故事分镜拆分
//!
//! 将用户提交的故事文本按句拆分，并按叙事顺序分组为若干分镜草稿。
//! 供本地开发后端在没有语言模型时生成分格。

/// 默认最小字符数（弱分隔符在未达到此长度时不分割）
pub const DEFAULT_MIN_CHARS: usize = 20;

/// 默认最大分格数
pub const DEFAULT_MAX_PANELS: usize = 6;

/// 标题最大字符数
const TITLE_MAX_CHARS: usize = 40;

/// 无法从文本中得到标题时使用
pub const FALLBACK_TITLE: &str = "My Daily Story";

/// 分镜拆分配置
#[derive(Debug, Clone)]
pub struct StoryboardConfig {
    /// 最小字符数限制（用于合并短句）
    pub min_chars: usize,
    /// 最多生成的分格数
    pub max_panels: usize,
}

impl Default for StoryboardConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_panels: DEFAULT_MAX_PANELS,
        }
    }
}

/// 一个分格的草稿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDraft {
    pub scene_description: String,
    pub dialogue: Option<String>,
}

#[inline]
fn is_strong_delimiter(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!')
}

#[inline]
fn is_weak_delimiter(ch: char) -> bool {
    matches!(ch, '，' | '；' | '：' | ',' | ';' | ':')
}

/// 按标点拆分单行（不做合并）
fn split_by_delimiters(line: &str, config: &StoryboardConfig) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut char_count = 0;

    for ch in line.chars() {
        current.push(ch);
        char_count += 1;

        let should_split = is_strong_delimiter(ch)
            || (is_weak_delimiter(ch) && char_count >= config.min_chars);

        if should_split {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
            char_count = 0;
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

/// 将过短的句子并入下一句，末尾剩余并入上一句
fn merge_short(sentences: Vec<String>, min_chars: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    let mut buffer = String::new();

    for sentence in sentences {
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(&sentence);

        if buffer.chars().count() >= min_chars {
            merged.push(std::mem::take(&mut buffer));
        }
    }

    if !buffer.is_empty() {
        match merged.last_mut() {
            Some(last) => {
                last.push(' ');
                last.push_str(&buffer);
            }
            None => merged.push(buffer),
        }
    }

    merged
}

/// 将故事拆分为句子（行之间不合并）
pub fn split_story(text: &str, config: &StoryboardConfig) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| merge_short(split_by_delimiters(line, config), config.min_chars))
        .collect()
}

/// 提取引号中的对白
fn extract_dialogue(text: &str) -> Option<String> {
    let mut quotes = Vec::new();
    let mut current: Option<(char, String)> = None;

    for ch in text.chars() {
        match current.as_mut() {
            Some((close, buf)) if ch == *close => {
                let spoken = buf.trim().to_string();
                if !spoken.is_empty() {
                    quotes.push(spoken);
                }
                current = None;
            }
            Some((_, buf)) => buf.push(ch),
            None => {
                let close = match ch {
                    '"' => Some('"'),
                    '\u{201C}' => Some('\u{201D}'),
                    '「' => Some('」'),
                    _ => None,
                };
                if let Some(close) = close {
                    current = Some((close, String::new()));
                }
            }
        }
    }

    if quotes.is_empty() {
        None
    } else {
        Some(quotes.join(" "))
    }
}

/// 将故事按叙事顺序分组为分镜草稿
///
/// 句子按连续区间均分到至多 max_panels 个分格中，顺序保持不变。
/// 非空文本至少产生一个分格。
pub fn draft_scenes(text: &str, config: &StoryboardConfig) -> Vec<SceneDraft> {
    let sentences = split_story(text, config);
    if sentences.is_empty() {
        return Vec::new();
    }

    let total = sentences.len();
    let panels = total.min(config.max_panels.max(1));

    (0..panels)
        .map(|i| {
            let start = i * total / panels;
            let end = (i + 1) * total / panels;
            let scene = sentences[start..end].join(" ");
            SceneDraft {
                dialogue: extract_dialogue(&scene),
                scene_description: scene,
            }
        })
        .collect()
}

/// 由故事首句派生标题
pub fn derive_title(text: &str) -> String {
    let config = StoryboardConfig {
        min_chars: 1,
        ..Default::default()
    };
    let first = split_story(text, &config)
        .into_iter()
        .next()
        .unwrap_or_default();

    let cleaned: String = first
        .trim_end_matches(|c: char| is_strong_delimiter(c) || is_weak_delimiter(c))
        .trim()
        .to_string();

    if cleaned.is_empty() {
        return FALLBACK_TITLE.to_string();
    }

    if cleaned.chars().count() > TITLE_MAX_CHARS {
        let truncated: String = cleaned.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}…", truncated.trim_end())
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_delimiters_split_sentences() {
        let config = StoryboardConfig {
            min_chars: 1,
            ..Default::default()
        };
        let sentences = split_story("I woke up. I ate! Did I run?", &config);
        assert_eq!(sentences, vec!["I woke up.", "I ate!", "Did I run?"]);
    }

    #[test]
    fn test_short_sentences_are_merged() {
        let config = StoryboardConfig {
            min_chars: 20,
            ..Default::default()
        };
        let sentences = split_story("Hi. Bye. I went hiking in the mountains today.", &config);
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].starts_with("Hi. Bye."));
    }

    #[test]
    fn test_lines_are_not_merged() {
        let config = StoryboardConfig {
            min_chars: 50,
            ..Default::default()
        };
        let sentences = split_story("第一行。\n第二行。", &config);
        assert_eq!(sentences, vec!["第一行。", "第二行。"]);
    }

    #[test]
    fn test_draft_scenes_caps_panel_count_and_keeps_order() {
        let config = StoryboardConfig {
            min_chars: 1,
            max_panels: 3,
        };
        let text = "One. Two. Three. Four. Five. Six. Seven.";
        let drafts = draft_scenes(text, &config);

        assert_eq!(drafts.len(), 3);
        assert!(drafts[0].scene_description.starts_with("One."));
        assert!(drafts[2].scene_description.ends_with("Seven."));
    }

    #[test]
    fn test_single_sentence_yields_one_panel() {
        let drafts = draft_scenes("I went hiking and saw a fox", &StoryboardConfig::default());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].scene_description, "I went hiking and saw a fox");
    }

    #[test]
    fn test_blank_text_yields_no_drafts() {
        assert!(draft_scenes(" \n ", &StoryboardConfig::default()).is_empty());
    }

    #[test]
    fn test_dialogue_extraction() {
        assert_eq!(
            extract_dialogue("She shouted \"Look, a fox!\" and pointed."),
            Some("Look, a fox!".to_string())
        );
        assert_eq!(
            extract_dialogue("他说\u{201C}你好\u{201D}。"),
            Some("你好".to_string())
        );
        assert_eq!(extract_dialogue("No speech here."), None);
    }

    #[test]
    fn test_derive_title() {
        assert_eq!(derive_title("I went hiking. It rained."), "I went hiking");
        assert_eq!(derive_title("   "), FALLBACK_TITLE);

        let long = derive_title(&"word ".repeat(30));
        assert!(long.ends_with('…'));
        assert!(long.chars().count() <= TITLE_MAX_CHARS + 1);
    }
}
