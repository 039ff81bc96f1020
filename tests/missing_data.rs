use std::{
    fmt, fs,
    sync::{Arc, Mutex},
};

use tempfile::tempdir;
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer,
};
use user_languages::UserLanguages;

/// Collects the message of every WARN event.
#[derive(Clone, Default)]
struct Warnings(Arc<Mutex<Vec<String>>>);

impl Warnings {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

struct Message(String);

impl Visit for Message {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for Warnings {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut msg = Message(String::new());
            event.record(&mut msg);
            self.0.lock().unwrap().push(msg.0);
        }
    }
}

fn with_warnings<T>(f: impl FnOnce(&Warnings) -> T) -> T {
    let warnings = Warnings::default();
    let subscriber = tracing_subscriber::registry().with(warnings.clone());
    tracing::subscriber::with_default(subscriber, || f(&warnings))
}

#[test]
fn missing_file_warns_once_per_iteration() {
    let tmp = tempdir().unwrap();
    let table = UserLanguages::with_data_dir("xpq", tmp.path());

    with_warnings(|warnings| {
        assert_eq!(table.iter().count(), 0);
        let first = warnings.take();
        assert_eq!(first.len(), 1);
        assert!(first[0].contains("user_languages"), "got {:?}", first[0]);

        // a second pass warns again, exactly once
        let mut it = table.iter();
        assert!(it.next().is_none());
        assert!(it.next().is_none());
        assert_eq!(warnings.take().len(), 1);
    });
}

#[test]
fn present_file_does_not_warn() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("user_languages");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("eng_user_languages.tsv"),
        "eng\t5\talice\tgood speaker\neng\tN\tbob\t\n",
    )
    .unwrap();
    let table = UserLanguages::with_data_dir("eng", tmp.path());

    with_warnings(|warnings| {
        let rows: Vec<_> = table.iter().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].skill_level().unwrap(), Some(5));
        assert_eq!(rows[1].skill_level().unwrap(), None);
        assert!(warnings.take().is_empty());
    });
}

#[test]
fn undecodable_row_is_an_error_item_without_warning() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("user_languages");
    fs::create_dir_all(&dir).unwrap();
    let mut data = b"por\t2\tana\tok\n".to_vec();
    data.extend_from_slice(b"por\t3\t\xfe\xff\t\n");
    data.extend_from_slice(b"por\t1\tzed\t\n");
    fs::write(dir.join("por_user_languages.tsv"), data).unwrap();
    let table = UserLanguages::with_data_dir("por", tmp.path());

    with_warnings(|warnings| {
        let rows: Vec<_> = table.iter().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_ref().unwrap().username(), "ana");
        let err = format!("{:#}", rows[1].as_ref().unwrap_err());
        assert!(err.contains("por_user_languages.tsv:2"), "got {}", err);
        assert_eq!(rows[2].as_ref().unwrap().username(), "zed");
        assert!(warnings.take().is_empty());
    });
}
