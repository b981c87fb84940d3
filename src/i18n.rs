// i18n.rs — runtime UI string tables
//
// Tables live in assets/i18n.json as { "<lang>": { "key": "value" } }, or one file per
// language in assets/i18n/<lang>.json. Lookups fall back to English, then to the key.
// Language: --lang <code>, then PANORAMA_LANG, then "en".

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const FALLBACK_LANG: &str = "en";

pub const LANGUAGES: [(&str, &str); 4] = [
    ("en", "English"),
    ("zh-Hans", "简体中文"),
    ("ja", "日本語"),
    ("fr", "Français"),
];

type Table = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
struct Strings {
    lang: String,
    table: Table,
    fallback: Table,
}

static STRINGS: OnceCell<RwLock<Strings>> = OnceCell::new();

fn asset_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(dir.join("assets"));
    }
    roots.push(PathBuf::from("assets"));
    roots
}

fn read_table(path: &Path) -> Option<Table> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

fn read_bundle(path: &Path, lang: &str) -> Option<Table> {
    let text = std::fs::read_to_string(path).ok()?;
    let mut all: HashMap<String, Table> = serde_json::from_str(&text).ok()?;
    all.remove(lang)
}

fn load_table(lang: &str) -> Table {
    for root in asset_roots() {
        let single = root.join("i18n").join(format!("{lang}.json"));
        if let Some(t) = read_table(&single) {
            return t;
        }
        if let Some(t) = read_bundle(&root.join("i18n.json"), lang) {
            return t;
        }
    }
    log::warn!("no string table found for language `{lang}`");
    Table::new()
}

/// (Re)loads the tables for `lang`. Later calls replace the active language.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let table = load_table(&lang);
    let fallback = if lang == FALLBACK_LANG {
        table.clone()
    } else {
        load_table(FALLBACK_LANG)
    };
    let strings = Strings {
        lang,
        table,
        fallback,
    };

    match STRINGS.get() {
        Some(lock) => {
            if let Ok(mut w) = lock.write() {
                *w = strings;
            }
        }
        None => {
            let _ = STRINGS.set(RwLock::new(strings));
        }
    }
}

pub fn current_lang() -> String {
    STRINGS
        .get()
        .and_then(|l| l.read().ok().map(|s| s.lang.clone()))
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

/// Localized text for `key`, or the key itself when missing.
pub fn tr(key: &str) -> String {
    let Some(s) = STRINGS.get().and_then(|l| l.read().ok()) else {
        return key.to_string();
    };
    s.table
        .get(key)
        .or_else(|| s.fallback.get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

fn substitute(template: String, args: &[(&str, String)]) -> String {
    args.iter().fold(template, |acc, (k, v)| {
        acc.replace(&format!("{{{k}}}"), v)
    })
}

/// `tr` with `{name}` placeholders filled in; unknown placeholders stay as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    substitute(tr(key), args)
}

fn lang_from(cli: Option<&str>, env: Option<String>) -> String {
    cli.map(str::to_owned)
        .into_iter()
        .chain(env)
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

/// `--lang` if given, else `PANORAMA_LANG`, else the fallback language.
pub fn resolve_lang(cli: Option<&str>) -> String {
    lang_from(cli, std::env::var("PANORAMA_LANG").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_filled_and_unknown_ones_kept() {
        let s = substitute(
            "{w}x{h} from {path}".to_string(),
            &[("w", "4096".into()), ("h", "2048".into())],
        );
        assert_eq!(s, "4096x2048 from {path}");
    }

    #[test]
    fn cli_beats_env_beats_default() {
        assert_eq!(lang_from(Some("ja"), Some("fr".into())), "ja");
        assert_eq!(lang_from(None, Some("fr".into())), "fr");
        assert_eq!(lang_from(None, Some("  ".into())), "en");
        assert_eq!(lang_from(Some(""), None), "en");
    }
}
