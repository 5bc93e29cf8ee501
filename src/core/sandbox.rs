//! Sandbox preview file tables.
//!
//! [`FileTable::from_message`] turns the annotated fences of one message into
//! the file set handed to the in-browser preview. `package.json` is special:
//! only its dependency list is forwarded, and a manifest that fails to parse
//! is dropped with a warning instead of failing the whole table.

use crate::core::fence::{FenceMatch, FenceScanner};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

pub const MANIFEST_FILENAME: &str = "package.json";

pub type Dependencies = BTreeMap<String, String>;

/// A single file in the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEntry {
    Source { code: String },
    Manifest { dependencies: Dependencies },
}

impl FileEntry {
    /// Text pushed into the preview editor for this file.
    pub fn preview_contents(&self) -> String {
        match self {
            FileEntry::Source { code } => code.clone(),
            FileEntry::Manifest { dependencies } => {
                serde_json::json!({ "dependencies": dependencies }).to_string()
            }
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            FileEntry::Source { code } => Some(code),
            FileEntry::Manifest { .. } => None,
        }
    }

    pub fn dependencies(&self) -> Option<&Dependencies> {
        match self {
            FileEntry::Source { .. } => None,
            FileEntry::Manifest { dependencies } => Some(dependencies),
        }
    }
}

impl Serialize for FileEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct ManifestContent<'a> {
            dependencies: &'a Dependencies,
        }

        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            FileEntry::Source { code } => map.serialize_entry("code", code)?,
            FileEntry::Manifest { dependencies } => {
                map.serialize_entry("content", &ManifestContent { dependencies })?
            }
        }
        map.end()
    }
}

/// Errors raised while reading a `package.json` fence.
#[derive(Debug)]
pub enum ManifestError {
    Parse(serde_json::Error),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Parse(source) => write!(f, "Error parsing {MANIFEST_FILENAME}: {source}"),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Parse(source) => Some(source),
        }
    }
}

/// Read the dependency list of a `package.json` body.
///
/// Only a JSON syntax error is fatal. A root that is not an object, or a
/// `dependencies` field that is not an object, yields an empty map. Numeric
/// and boolean versions are stringified; null, array and object versions
/// are dropped with a warning.
pub fn parse_manifest(body: &str) -> Result<FileEntry, ManifestError> {
    let manifest: Value = serde_json::from_str(body).map_err(ManifestError::Parse)?;
    let mut dependencies = Dependencies::new();
    if let Some(Value::Object(entries)) = manifest.get("dependencies") {
        for (name, version) in entries {
            match version {
                Value::String(version) => {
                    dependencies.insert(name.clone(), version.clone());
                }
                Value::Number(_) | Value::Bool(_) => {
                    dependencies.insert(name.clone(), version.to_string());
                }
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    warn!(dependency = %name, "dropping dependency without a version string");
                }
            }
        }
    }
    Ok(FileEntry::Manifest { dependencies })
}

/// Filename-keyed preview files in first-seen order.
///
/// A later insert for an existing filename replaces the entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTable {
    entries: Vec<(String, FileEntry)>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_message(text: &str) -> Self {
        Self::from_matches(FenceScanner::new(text))
    }

    pub fn from_matches<'t, I>(matches: I) -> Self
    where
        I: IntoIterator<Item = FenceMatch<'t>>,
    {
        let mut table = Self::new();
        for fence in matches {
            if fence.filename == MANIFEST_FILENAME {
                match parse_manifest(fence.body) {
                    Ok(entry) => table.insert(fence.filename, entry),
                    Err(err) => warn!(error = %err, "skipping unparseable manifest fence"),
                }
            } else {
                table.insert(
                    fence.filename,
                    FileEntry::Source {
                        code: fence.body.to_string(),
                    },
                );
            }
        }
        debug!(files = table.len(), "built sandbox file table");
        table
    }

    pub fn insert(&mut self, filename: &str, entry: FileEntry) {
        match self.entries.iter_mut().find(|(name, _)| name == filename) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((filename.to_string(), entry)),
        }
    }

    pub fn get(&self, filename: &str) -> Option<&FileEntry> {
        self.entries
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FileTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

pub fn create_sandbox_files(text: &str) -> FileTable {
    FileTable::from_message(text)
}

/// A file the preview must (re)load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    pub filename: String,
    pub contents: String,
}

/// Files currently loaded in a preview.
#[derive(Debug, Default)]
pub struct SandboxSession {
    files: HashMap<String, String>,
}

impl SandboxSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push every table entry the preview is missing, holds stale, or holds
    /// empty. Files the table does not mention are kept.
    pub fn sync(&mut self, table: &FileTable) -> Vec<FileUpdate> {
        let mut updates = Vec::new();
        for (filename, entry) in table.iter() {
            let contents = entry.preview_contents();
            let stale = match self.files.get(filename) {
                Some(current) => current.is_empty() || *current != contents,
                None => true,
            };
            if stale {
                self.files.insert(filename.to_string(), contents.clone());
                updates.push(FileUpdate {
                    filename: filename.to_string(),
                    contents,
                });
            }
        }
        updates
    }

    pub fn file(&self, filename: &str) -> Option<&str> {
        self.files.get(filename).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fence::scan_fences;

    fn fence(tag: &str, name: &str, body: &str) -> String {
        format!("```{tag}={name}\n{body}\n```\n")
    }

    #[test]
    fn no_fences_yields_empty_table() {
        assert!(FileTable::from_message("just chatting, no code").is_empty());
        assert!(FileTable::from_message("```rust\nfn main() {}\n```").is_empty());
    }

    #[test]
    fn source_and_manifest_scenario() {
        let text = format!(
            "{}{}",
            fence("js", "index.js", "console.log(1)"),
            fence("json", "package.json", r#"{"dependencies":{"lodash":"4.0.0"}}"#)
        );
        let table = FileTable::from_message(&text);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("index.js").and_then(FileEntry::code), Some("console.log(1)"));
        let deps = table
            .get("package.json")
            .and_then(FileEntry::dependencies)
            .expect("manifest entry");
        assert_eq!(deps.get("lodash").map(String::as_str), Some("4.0.0"));

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "index.js": { "code": "console.log(1)" },
                "package.json": { "content": { "dependencies": { "lodash": "4.0.0" } } }
            })
        );
    }

    #[test]
    fn manifest_without_dependencies_gets_empty_map() {
        let text = fence("json", "package.json", r#"{"name":"demo"}"#);
        let table = FileTable::from_message(&text);
        assert_eq!(
            table.get("package.json"),
            Some(&FileEntry::Manifest {
                dependencies: Dependencies::new()
            })
        );
    }

    #[test]
    fn invalid_manifest_is_skipped_without_affecting_others() {
        let text = format!(
            "{}{}{}",
            fence("js", "index.js", "console.log(1)"),
            fence("json", "package.json", "{ not json"),
            fence("css", "styles.css", "body { margin: 0 }")
        );
        let table = FileTable::from_message(&text);

        assert!(table.get("package.json").is_none());
        assert_eq!(table.filenames().collect::<Vec<_>>(), vec!["index.js", "styles.css"]);
    }

    #[test]
    fn invalid_manifest_keeps_earlier_valid_one() {
        let text = format!(
            "{}{}",
            fence("json", "package.json", r#"{"dependencies":{"react":"18.0.0"}}"#),
            fence("json", "package.json", "oops")
        );
        let table = FileTable::from_message(&text);
        let deps = table.get("package.json").and_then(FileEntry::dependencies).unwrap();
        assert_eq!(deps.get("react").map(String::as_str), Some("18.0.0"));
    }

    fn manifest_deps(body: &str) -> Option<Dependencies> {
        FileTable::from_message(&fence("json", "package.json", body))
            .get("package.json")
            .and_then(FileEntry::dependencies)
            .cloned()
    }

    #[test]
    fn manifest_of_wrong_shape_is_kept_with_empty_dependencies() {
        for body in ["5", "true", "[]", "null", r#""text""#, r#"{"dependencies": false}"#] {
            assert_eq!(
                manifest_deps(body),
                Some(Dependencies::new()),
                "body={body}"
            );
        }
    }

    #[test]
    fn non_string_versions_are_stringified_or_dropped() {
        let deps = manifest_deps(
            r#"{"dependencies": {"react": 18, "left-pad": true, "x": null, "y": ["1"], "z": "2.0"}}"#,
        )
        .expect("manifest entry");
        let expected: Dependencies = [
            ("left-pad".to_string(), "true".to_string()),
            ("react".to_string(), "18".to_string()),
            ("z".to_string(), "2.0".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(deps, expected);
    }

    #[test]
    fn duplicate_filenames_collapse_to_last_write() {
        let text = format!(
            "{}{}{}",
            fence("js", "app.js", "v1"),
            fence("js", "util.js", "helper"),
            fence("js", "app.js", "v2")
        );
        let table = FileTable::from_message(&text);

        assert_eq!(table.len(), 2);
        assert_eq!(table.filenames().collect::<Vec<_>>(), vec!["app.js", "util.js"]);
        assert_eq!(table.get("app.js").and_then(FileEntry::code), Some("v2"));
    }

    #[test]
    fn stored_code_rescans_to_itself() {
        let text = "```py=main.py\nprint('a')\n\nprint('b')\n```";
        let table = FileTable::from_message(text);
        let code = table.get("main.py").and_then(FileEntry::code).unwrap();

        let rewrapped = fence("py", "main.py", code);
        let again = scan_fences(&rewrapped).next().unwrap();
        assert_eq!(again.body, code);
    }

    #[test]
    fn build_is_deterministic() {
        let text = format!(
            "{}{}",
            fence("js", "b.js", "2"),
            fence("json", "package.json", r#"{"dependencies":{"a":"1","b":"2"}}"#)
        );
        assert_eq!(FileTable::from_message(&text), FileTable::from_message(&text));
    }

    #[test]
    fn session_sync_pushes_only_changes() {
        let mut session = SandboxSession::new();
        let first = FileTable::from_message(&format!(
            "{}{}",
            fence("js", "index.js", "console.log(1)"),
            fence("json", "package.json", r#"{"dependencies":{"lodash":"4.0.0"}}"#)
        ));

        let updates = session.sync(&first);
        assert_eq!(updates.len(), 2);
        assert_eq!(
            session.file("package.json"),
            Some(r#"{"dependencies":{"lodash":"4.0.0"}}"#)
        );

        assert!(session.sync(&first).is_empty());

        let second = FileTable::from_message(&fence("js", "index.js", "console.log(2)"));
        let updates = session.sync(&second);
        assert_eq!(
            updates,
            vec![FileUpdate {
                filename: "index.js".into(),
                contents: "console.log(2)".into(),
            }]
        );
        assert_eq!(session.len(), 2);
    }

    mod logging {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing::{Event, Level, Subscriber};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        struct WarnCounter {
            warnings: Arc<AtomicUsize>,
        }

        impl<S: Subscriber> Layer<S> for WarnCounter {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                if *event.metadata().level() == Level::WARN {
                    self.warnings.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        fn warnings_while_building(text: &str) -> usize {
            let warnings = Arc::new(AtomicUsize::new(0));
            let subscriber = tracing_subscriber::registry().with(WarnCounter {
                warnings: Arc::clone(&warnings),
            });
            tracing::subscriber::with_default(subscriber, || {
                FileTable::from_message(text);
            });
            warnings.load(Ordering::SeqCst)
        }

        #[test]
        fn unparseable_manifest_logs_one_warning() {
            let text = format!(
                "{}{}",
                fence("js", "index.js", "console.log(1)"),
                fence("json", "package.json", "{ not json")
            );
            assert_eq!(warnings_while_building(&text), 1);
        }

        #[test]
        fn valid_input_logs_no_warning() {
            let text = format!(
                "{}{}",
                fence("js", "index.js", "console.log(1)"),
                fence("json", "package.json", r#"{"dependencies":{"lodash":"4.0.0"}}"#)
            );
            assert_eq!(warnings_while_building(&text), 0);
        }
    }
}
