use commit_photos::blame::{AuthorshipSource, GitBlame};
use commit_photos::metadata::{CaptureMetadata, MetadataReader};
use commit_photos::model::Assignment;
use commit_photos::store::{AssetStore, KeyValueStore, Lookup, MemoryStore, SqliteStore};
use commit_photos::{run, Error, RunConfig};
use git2::{Commit, Repository, Signature, Time};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct StubReader(HashMap<&'static str, i64>);

impl MetadataReader for StubReader {
    fn read(&self, path: &Path) -> commit_photos::Result<CaptureMetadata> {
        let name = path.file_name().unwrap().to_string_lossy();
        match self.0.get(&*name) {
            Some(&capture_epoch) => Ok(CaptureMetadata { capture_epoch, thumbnail: b"thumbnail".to_vec() }),
            None => Err(Error::MissingCaptureTime(path.to_path_buf())),
        }
    }
}

struct Workspace {
    _root: TempDir,
    repo: Repository,
    config: RunConfig,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().expect("tempdir");
        let wiki = root.path().join("wiki");
        let card = root.path().join("card");
        fs::create_dir_all(&wiki).expect("create wiki");
        fs::create_dir_all(&card).expect("create card");
        let repo = Repository::init(&wiki).expect("init repo");
        let config = RunConfig {
            document_dir: wiki,
            asset_dir: card,
            dest_dir: root.path().join("static").join("img"),
            ..RunConfig::default()
        };
        Self { _root: root, repo, config }
    }

    fn commit(&self, name: &str, content: &str, when: i64) {
        fs::write(self.config.document_dir.join(name), content).expect("write document");
        let mut index = self.repo.index().expect("index");
        index.add_path(Path::new(name)).expect("add path");
        index.write().expect("write index");
        let tree = self.repo.find_tree(index.write_tree().expect("write tree")).expect("tree");
        let sig = Signature::new("Archivist", "archivist@example.com", &Time::new(when, 0)).expect("sig");
        let parent = self.repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, "edit", &tree, &parents)
            .expect("commit");
    }

    fn photo(&self, name: &str) {
        fs::write(self.config.asset_dir.join(name), format!("full size {name}")).expect("write photo");
    }

    fn document(&self, name: &str) -> String {
        fs::read_to_string(self.config.document_dir.join(name)).expect("read document")
    }

    fn key(&self, name: &str) -> String {
        fs::canonicalize(self.config.asset_dir.join(name))
            .expect("canonicalize")
            .to_string_lossy()
            .into_owned()
    }
}

fn reference(name: &str) -> String {
    format!("[![An archival photo](/img/archivalPhotos/{name}.thumb.jpg)](/img/archivalPhotos/{name})")
}

fn assignment<S: KeyValueStore>(store: &AssetStore<S>, key: &str) -> Option<Assignment> {
    match store.lookup(key).expect("lookup") {
        Lookup::Found(record) => Some(record.assignment),
        _ => None,
    }
}

#[test]
fn git_blame_splits_document_by_commit() {
    let ws = Workspace::new();
    ws.commit("notes.page", "intro\nbody\n", 1_000);
    ws.commit("notes.page", "intro\nbody\nmore\n", 5_000);

    let blame = GitBlame::discover(&ws.config.document_dir).expect("discover");
    let blocks = blame.blocks(&ws.config.document_dir.join("notes.page")).expect("blame");

    let summary: Vec<(i64, Vec<String>)> = blocks.into_iter().map(|b| (b.timestamp, b.lines)).collect();
    assert_eq!(
        summary,
        vec![
            (1_000, vec!["intro\n".to_string(), "body\n".to_string()]),
            (5_000, vec!["more\n".to_string()]),
        ]
    );
}

#[test]
fn photo_before_commit_is_spliced_before_its_last_line_and_rerun_is_a_no_op() {
    let ws = Workspace::new();
    ws.commit("notes.page", "A\nB\n", 1_000);
    ws.photo("P1.JPG");

    let blame = GitBlame::discover(&ws.config.document_dir).expect("discover");
    let reader = StubReader(HashMap::from([("P1.JPG", 900)]));
    let mut store = AssetStore::new(MemoryStore::new());

    let report = run(&ws.config, &mut store, &blame, &reader).expect("first run");
    assert_eq!((report.placed, report.documents_rewritten), (1, 1));
    assert_eq!(ws.document("notes.page"), format!("A\n\n{}\n\nB\n\n\n", reference("P1.JPG")));
    assert_eq!(assignment(&store, &ws.key("P1.JPG")), Some(Assignment::Assigned(0)));
    assert_eq!(fs::read(ws.config.dest_dir.join("P1.JPG.thumb.jpg")).expect("thumb"), b"thumbnail");
    assert!(ws.config.dest_dir.join("P1.JPG").exists());

    let doc_path = ws.config.document_dir.join("notes.page");
    let modified = fs::metadata(&doc_path).expect("metadata").modified().expect("mtime");
    let cache_before = store.backend().clone();

    let report = run(&ws.config, &mut store, &blame, &reader).expect("second run");
    assert_eq!((report.placed, report.skipped, report.documents_rewritten), (0, 0, 0));
    assert_eq!(fs::metadata(&doc_path).expect("metadata").modified().expect("mtime"), modified);
    assert_eq!(store.backend(), &cache_before);
}

#[test]
fn photos_sharing_an_anchor_accumulate_and_untouched_documents_stay_put() {
    let ws = Workspace::new();
    ws.commit("a.page", "intro\nbody\n", 1_000);
    ws.commit("a.page", "intro\nbody\nmore\n", 5_000);
    ws.commit("b.page", "other\n", 50_000);
    ws.photo("P1.JPG");
    ws.photo("P2.JPG");
    ws.photo("P3.JPG");

    let b_modified = fs::metadata(ws.config.document_dir.join("b.page"))
        .expect("metadata")
        .modified()
        .expect("mtime");

    let cache_dir = TempDir::new().expect("cache dir");
    let cache_path = cache_dir.path().join("exifCache.sqlite");
    let blame = GitBlame::discover(&ws.config.document_dir).expect("discover");
    let reader = StubReader(HashMap::from([("P1.JPG", 5_100), ("P2.JPG", 5_050), ("P3.JPG", 30_000)]));

    {
        let mut store = AssetStore::new(SqliteStore::open(&cache_path).expect("open cache"));
        let report = run(&ws.config, &mut store, &blame, &reader).expect("run");
        assert_eq!((report.placed, report.skipped, report.failed), (2, 1, 0));
    }

    assert_eq!(
        ws.document("a.page"),
        format!("intro\nbody\n\n\nmore\n\n{}\n{}\n\n", reference("P1.JPG"), reference("P2.JPG"))
    );
    assert_eq!(ws.document("b.page"), "other\n");
    assert_eq!(
        fs::metadata(ws.config.document_dir.join("b.page")).expect("metadata").modified().expect("mtime"),
        b_modified
    );

    let store = AssetStore::new(SqliteStore::open(&cache_path).expect("reopen cache"));
    assert_eq!(assignment(&store, &ws.key("P1.JPG")), Some(Assignment::Assigned(0)));
    assert_eq!(assignment(&store, &ws.key("P2.JPG")), Some(Assignment::Assigned(0)));
    assert_eq!(assignment(&store, &ws.key("P3.JPG")), Some(Assignment::Skipped));
    assert!(!ws.config.dest_dir.join("P3.JPG").exists());
}

#[test]
fn photo_without_capture_time_is_retried_next_run() {
    let ws = Workspace::new();
    ws.commit("notes.page", "A\n", 1_000);
    ws.photo("P1.JPG");

    let blame = GitBlame::discover(&ws.config.document_dir).expect("discover");
    let mut store = AssetStore::new(MemoryStore::new());

    let report = run(&ws.config, &mut store, &blame, &StubReader(HashMap::new())).expect("run");
    assert_eq!(report.failed, 1);
    assert_eq!(store.lookup(&ws.key("P1.JPG")).expect("lookup"), Lookup::NotCached);
    assert_eq!(ws.document("notes.page"), "A\n");

    let reader = StubReader(HashMap::from([("P1.JPG", 1_000)]));
    let report = run(&ws.config, &mut store, &blame, &reader).expect("rerun");
    assert_eq!(report.placed, 1);
    assert_eq!(ws.document("notes.page"), format!("\n\nA\n\n{}\n\n", reference("P1.JPG")));
}

#[test]
fn uncommitted_page_is_left_out_and_the_rest_still_processed() {
    let ws = Workspace::new();
    ws.commit("notes.page", "A\n", 1_000);
    fs::write(ws.config.document_dir.join("draft.page"), "never committed\n").expect("write draft");
    ws.photo("P1.JPG");

    let blame = GitBlame::discover(&ws.config.document_dir).expect("discover");
    let reader = StubReader(HashMap::from([("P1.JPG", 1_000)]));
    let mut store = AssetStore::new(MemoryStore::new());

    let report = run(&ws.config, &mut store, &blame, &reader).expect("run");
    assert_eq!((report.placed, report.documents_rewritten), (1, 1));
    assert_eq!(ws.document("notes.page"), format!("\n\nA\n\n{}\n\n", reference("P1.JPG")));
    assert_eq!(ws.document("draft.page"), "never committed\n");
    assert_eq!(assignment(&store, &ws.key("P1.JPG")), Some(Assignment::Assigned(0)));
}

#[test]
fn repository_without_commits_cannot_be_blamed() {
    let ws = Workspace::new();
    assert!(GitBlame::discover(&ws.config.document_dir).is_err());
}

#[test]
fn crlf_lines_survive_a_splice() {
    let ws = Workspace::new();
    ws.commit("notes.page", "X\r\nY\r\nZ\r\n", 1_000);
    ws.photo("P1.JPG");

    let blame = GitBlame::discover(&ws.config.document_dir).expect("discover");
    let reader = StubReader(HashMap::from([("P1.JPG", 900)]));
    let mut store = AssetStore::new(MemoryStore::new());

    let report = run(&ws.config, &mut store, &blame, &reader).expect("run");
    assert_eq!(report.placed, 1);
    assert_eq!(
        ws.document("notes.page"),
        format!("X\r\nY\r\n\r\n{}\r\n\r\nZ\r\n\r\n\r\n", reference("P1.JPG"))
    );
}

#[test]
fn document_with_uncommitted_edits_is_left_alone() {
    let ws = Workspace::new();
    ws.commit("notes.page", "A\n", 1_000);
    fs::write(ws.config.document_dir.join("notes.page"), "A\nlocal edit\n").expect("edit");
    ws.photo("P1.JPG");

    let blame = GitBlame::discover(&ws.config.document_dir).expect("discover");
    let reader = StubReader(HashMap::from([("P1.JPG", 1_000)]));
    let mut store = AssetStore::new(MemoryStore::new());

    let report = run(&ws.config, &mut store, &blame, &reader).expect("run");
    assert_eq!((report.placed, report.failed, report.documents_rewritten), (0, 1, 0));
    assert_eq!(ws.document("notes.page"), "A\nlocal edit\n");
    assert_eq!(assignment(&store, &ws.key("P1.JPG")), Some(Assignment::Unassigned));
}
