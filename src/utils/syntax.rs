use crate::ui::theme::Theme;
use ratatui::style::{Color as TuiColor, Style};
use ratatui::text::{Line, Span};
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{LazyLock, Mutex, OnceLock};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const CACHE_CAPACITY: usize = 64;

type CacheKey = (String, u64);

/// Bounded FIFO of highlighted blocks.
struct HighlightCache {
    map: HashMap<CacheKey, Vec<Line<'static>>>,
    order: VecDeque<CacheKey>,
    cap: usize,
}

impl HighlightCache {
    fn new(cap: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            cap,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<Vec<Line<'static>>> {
        self.map.get(key).cloned()
    }

    fn put(&mut self, key: CacheKey, lines: Vec<Line<'static>>) {
        if !self.map.contains_key(&key) {
            self.order.push_back(key.clone());
        }
        self.map.insert(key, lines);
        while self.map.len() > self.cap {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                }
                None => break,
            }
        }
    }
}

static CACHE: LazyLock<Mutex<HighlightCache>> =
    LazyLock::new(|| Mutex::new(HighlightCache::new(CACHE_CAPACITY)));

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

fn hash_code(lang: &str, code: &str, theme_sig: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    lang.hash(&mut hasher);
    code.hash(&mut hasher);
    theme_sig.hash(&mut hasher);
    hasher.finish()
}

fn is_dark_background(c: &TuiColor) -> bool {
    match c {
        TuiColor::Rgb(r, g, b) => {
            let br = 0.2126 * (*r as f32) + 0.7152 * (*g as f32) + 0.0722 * (*b as f32);
            br < 128.0
        }
        TuiColor::White => false,
        _ => true,
    }
}

pub(crate) fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" => "bash".into(),
        "js" | "javascript" | "jsx" => "javascript".into(),
        "ts" | "tsx" | "typescript" => "typescript".into(),
        "rust" | "rs" => "rust".into(),
        "c" | "h" => "c".into(),
        "cpp" | "c++" | "cc" | "cxx" | "hpp" => "cpp".into(),
        "c#" | "cs" | "csharp" => "cs".into(),
        "objective-c" | "objc" => "objc".into(),
        "yaml" | "yml" => "yaml".into(),
        "kotlin" | "kt" => "kotlin".into(),
        other => other.into(),
    }
}

pub(crate) fn pick_syntect_theme_name(theme: &Theme) -> &'static str {
    if is_dark_background(&theme.background_color) {
        "base16-ocean.dark"
    } else {
        "InspiredGitHub"
    }
}

fn theme_signature(theme: &Theme, chosen: &str) -> String {
    format!(
        "{}|{:?}|{:?}",
        chosen, theme.codeblock_bg, theme.background_color
    )
}

/// Highlight `code` for display in a code block body. Returns `None` when
/// syntect cannot process the input so callers can fall back to plain lines.
pub fn highlight_code_block(
    lang_hint: &str,
    code: &str,
    theme: &Theme,
) -> Option<Vec<Line<'static>>> {
    let lang_norm = normalize_lang_hint(lang_hint);
    let theme_name = pick_syntect_theme_name(theme);
    let syn_theme = theme_set()
        .themes
        .get(theme_name)
        .or_else(|| theme_set().themes.get("base16-ocean.dark"))?;

    let key = (
        lang_norm.clone(),
        hash_code(&lang_norm, code, &theme_signature(theme, theme_name)),
    );
    if let Some(lines) = CACHE.lock().ok().and_then(|cache| cache.get(&key)) {
        return Some(lines);
    }

    let ps = syntax_set();
    let syntax = ps
        .find_syntax_by_token(&lang_norm)
        .unwrap_or_else(|| ps.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, syn_theme);

    let mut out: Vec<Line<'static>> = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = highlighter.highlight_line(line, ps).ok()?;
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .map(|(style, text)| {
                let fg = style.foreground;
                let mut st = Style::default().fg(TuiColor::Rgb(fg.r, fg.g, fg.b));
                if let Some(bg) = theme.codeblock_bg {
                    st = st.bg(bg);
                }
                Span::styled(text.trim_end_matches('\n').to_string(), st)
            })
            .collect();
        out.push(Line::from(spans));
    }

    if let Ok(mut cache) = CACHE.lock() {
        cache.put(key, out.clone());
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lang_hint_maps_common_aliases() {
        assert_eq!(normalize_lang_hint("py"), "python");
        assert_eq!(normalize_lang_hint("JS"), "javascript");
        assert_eq!(normalize_lang_hint("TsX"), "typescript");
        assert_eq!(normalize_lang_hint("yml"), "yaml");
        assert_eq!(normalize_lang_hint("c++"), "cpp");
        assert_eq!(normalize_lang_hint("rs"), "rust");
    }

    #[test]
    fn theme_selection_matches_brightness() {
        assert_eq!(
            pick_syntect_theme_name(&Theme::dark_default()),
            "base16-ocean.dark"
        );
        assert_eq!(pick_syntect_theme_name(&Theme::light()), "InspiredGitHub");
    }

    #[test]
    fn highlight_keeps_line_count_and_text() {
        let code = "fn main() {\n    println!(\"hi\");\n}";
        let lines = highlight_code_block("rust", code, &Theme::dark_default()).unwrap();
        assert_eq!(lines.len(), 3);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(text, vec!["fn main() {", "    println!(\"hi\");", "}"]);
    }

    #[test]
    fn cache_evicts_oldest() {
        let mut cache = HighlightCache::new(2);
        cache.put(("a".into(), 1), vec![]);
        cache.put(("b".into(), 2), vec![]);
        cache.put(("c".into(), 3), vec![]);
        assert!(cache.get(&("a".into(), 1)).is_none());
        assert!(cache.get(&("c".into(), 3)).is_some());
    }
}
