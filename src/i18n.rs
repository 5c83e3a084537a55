//! Localized user-facing messages
//!
//! The catalog is an immutable value built once at startup. Lookup resolves
//! in three steps: the requested language table, then the English table, then
//! a placeholder naming the missing key. It never fails, so every call site
//! gets displayable text.
//!
//! Messages support `{name}` placeholders substituted from lookup params.

use std::collections::HashMap;

/// Fallback language; its table must cover every key.
const BASE_LANG: &str = "en";

/// Immutable message catalog keyed by language, then message key.
pub struct Catalog {
    tables: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Catalog {
    /// Build the compiled-in catalog (English + Simplified Chinese).
    pub fn builtin() -> Self {
        let mut tables = HashMap::new();

        let en: HashMap<&'static str, &'static str> = [
            ("app_title", "macOS audio recording"),
            (
                "choose_mode",
                "\n1. Internal audio\n2. Microphone\n3. Both\n\nChoice: ",
            ),
            (
                "enter_duration_prompt",
                "Recording duration in seconds (empty for continuous): ",
            ),
            ("invalid_duration", "Invalid duration. Recording continuously."),
            ("compiling_in_progress", "Compiling in progress..."),
            ("compilation_failed", "Compilation failed:\n{error}"),
            ("running_in_progress", "Running in progress..."),
            (
                "starting_recording",
                "Starting recording. Output will be saved to: {output}",
            ),
            (
                "recording_complete",
                "Recording complete. Audio saved to {output}",
            ),
            ("recording_failed", "Recording failed: {error}"),
            ("error_message", "Error: {error}"),
            ("user_interrupted", "User interrupted"),
            ("goodbye", "Goodbye!"),
        ]
        .into_iter()
        .collect();

        let zh: HashMap<&'static str, &'static str> = [
            ("app_title", "macOS 音频录制"),
            ("choose_mode", "\n1. 系统内部音频\n2. 麦克风\n3. 两者\n\n选择: "),
            ("enter_duration_prompt", "录制秒数 (留空表示持续录制): "),
            ("invalid_duration", "时长无效。将持续录制。"),
            ("compiling_in_progress", "编译中..."),
            ("compilation_failed", "编译失败:\n{error}"),
            ("running_in_progress", "运行中..."),
            ("starting_recording", "开始录音。输出将保存到: {output}"),
            ("recording_complete", "录音完成。音频已保存到 {output}"),
            ("recording_failed", "录音失败: {error}"),
            ("error_message", "错误: {error}"),
            ("user_interrupted", "用户中断操作"),
            ("goodbye", "再见！"),
        ]
        .into_iter()
        .collect();

        tables.insert("en", en);
        tables.insert("zh", zh);

        Self { tables }
    }

    /// Look up a message, falling back to English, then to a placeholder
    /// naming the missing key. `{name}` placeholders are substituted from
    /// `params`.
    pub fn lookup(&self, lang: &str, key: &str, params: &[(&str, &str)]) -> String {
        let template = self
            .tables
            .get(lang)
            .and_then(|t| t.get(key))
            .or_else(|| self.tables.get(BASE_LANG).and_then(|t| t.get(key)));

        match template {
            Some(template) => substitute(template, params),
            None => format!("MISSING_MESSAGE_{}", key),
        }
    }
}

/// Catalog bound to one language; the narrow lookup handle passed around
/// the application.
pub struct Messages {
    catalog: Catalog,
    lang: String,
}

impl Messages {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            catalog: Catalog::builtin(),
            lang: lang.into(),
        }
    }

    pub fn get(&self, key: &str) -> String {
        self.catalog.lookup(&self.lang, key, &[])
    }

    pub fn format(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.catalog.lookup(&self.lang, key, params)
    }

    pub fn language(&self) -> &str {
        &self.lang
    }
}

/// Replace `{name}` placeholders with the given params. Unknown placeholders
/// are left as-is so a bad template is still visible rather than dropped.
fn substitute(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

/// Detect the user's language from the environment (`LC_ALL`, then `LANG`),
/// reduced to the primary subtag. Defaults to English.
pub fn detect_language() -> String {
    std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LANG"))
        .map(|locale| primary_subtag(&locale))
        .unwrap_or_else(|_| BASE_LANG.to_string())
}

/// Reduce a locale string like `zh_CN.UTF-8` to its primary subtag (`zh`).
fn primary_subtag(locale: &str) -> String {
    let lang = locale.split('.').next().unwrap_or(locale);
    let lang = lang.split('_').next().unwrap_or(lang);
    if lang.is_empty() || lang == "C" || lang == "POSIX" {
        BASE_LANG.to_string()
    } else {
        lang.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_lookup() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.lookup("en", "goodbye", &[]), "Goodbye!");
    }

    #[test]
    fn test_chinese_lookup() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.lookup("zh", "goodbye", &[]), "再见！");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.lookup("fr", "goodbye", &[]), "Goodbye!");
    }

    #[test]
    fn test_missing_key_yields_placeholder() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.lookup("en", "no_such_key", &[]),
            "MISSING_MESSAGE_no_such_key"
        );
    }

    #[test]
    fn test_param_substitution() {
        let catalog = Catalog::builtin();
        let msg = catalog.lookup("en", "recording_complete", &[("output", "out.wav")]);
        assert_eq!(msg, "Recording complete. Audio saved to out.wav");
    }

    #[test]
    fn test_substitution_in_fallback_template() {
        let catalog = Catalog::builtin();
        let msg = catalog.lookup("de", "error_message", &[("error", "boom")]);
        assert_eq!(msg, "Error: boom");
    }

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("zh_CN.UTF-8"), "zh");
        assert_eq!(primary_subtag("en_US"), "en");
        assert_eq!(primary_subtag("fr"), "fr");
        assert_eq!(primary_subtag("C"), "en");
        assert_eq!(primary_subtag(""), "en");
    }

    #[test]
    fn test_messages_handle() {
        let messages = Messages::new("zh");
        assert_eq!(messages.get("compiling_in_progress"), "编译中...");
        assert_eq!(messages.language(), "zh");
    }
}
