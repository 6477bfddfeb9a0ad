//! Integration tests for tagsieve
//!
//! These tests verify end-to-end functionality by writing gzipped CSV
//! exports to a temporary directory and running the full
//! load -> parse -> evaluate pipeline against them.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tagsieve::query;
use tagsieve::store::{PostStore, Prefilter, TagIndex};

/// Write `contents` gzipped to `dir/name` and return the path
fn write_gz(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

const POSTS_HEADER: &str = "id,uploader_id,created_at,md5,source,rating,image_width,image_height,tag_string,fav_count,file_ext,file_size,duration,is_deleted,is_pending,is_flagged,score,down_score";

fn md5_for(id: u64) -> String {
    format!("{id:032x}")
}

/// A small posts export: three clean posts, one deleted, one video
fn sample_posts_csv() -> String {
    let mut csv = String::from(POSTS_HEADER);
    csv.push('\n');
    for (id, rating, width, height, tags, fav, ext, size, duration, deleted, score) in [
        (1, "s", 800, 600, "wolf bear forest", 3, "jpg", 1000, "", "f", 5),
        (2, "q", 1200, 900, "wolf fox", 10, "png", 2000, "", "f", 20),
        (3, "e", 640, 480, "wolf bear", 7, "jpg", 1500, "", "f", 15),
        (4, "s", 800, 600, "wolf", 1, "jpg", 500, "", "t", 99),
        (5, "s", 1920, 1080, "wolf animated", 50, "webm", 9000, "4.5", "f", 30),
    ] {
        csv.push_str(&format!(
            "{id},100,2024-01-01 00:00:00,{md5},,{rating},{width},{height},{tags},{fav},{ext},{size},{duration},{deleted},f,f,{score},-1\n",
            md5 = md5_for(id),
        ));
    }
    csv
}

#[test]
fn test_load_parse_evaluate_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "posts.csv.gz", &sample_posts_csv());

    let store = PostStore::load(&path, &Prefilter::default()).unwrap();
    // The deleted post is dropped at load time
    assert_eq!(store.len(), 4);
    assert!(store.iter().all(|post| post.id != 4));

    let parsed = query::parse("+wolf -fox order:score").unwrap();
    let evaluation = store.evaluate(&parsed);
    let ids: Vec<u64> = evaluation.matches.iter().map(|post| post.id).collect();
    // fox-tagged post 2 excluded, the rest ascending by score
    assert_eq!(ids, vec![1, 3, 5]);
}

#[test]
fn test_prefilter_settings_apply_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "posts.csv.gz", &sample_posts_csv());

    let prefilter = Prefilter {
        allowed_exts: vec!["jpg".to_string(), "png".to_string()],
        min_width: 700,
        min_height: 500,
        ..Prefilter::default()
    };
    let store = PostStore::load(&path, &prefilter).unwrap();

    let ids: Vec<u64> = store.iter().map(|post| post.id).collect();
    // 3 is too small, 5 is a webm, 4 is deleted
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_duration_predicate_drops_only_still_images() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "posts.csv.gz", &sample_posts_csv());
    let store = PostStore::load(&path, &Prefilter::default()).unwrap();

    let parsed = query::parse("duration:>=1").unwrap();
    let evaluation = store.evaluate(&parsed);

    let ids: Vec<u64> = evaluation.matches.iter().map(|post| post.id).collect();
    assert_eq!(ids, vec![5]);
    // The three still images were dropped as field errors, not the query
    assert_eq!(evaluation.field_errors, 3);
}

#[test]
fn test_loaded_posts_derive_sharded_urls() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "posts.csv.gz", &sample_posts_csv());
    let store = PostStore::load(&path, &Prefilter::default()).unwrap();

    let post = store.iter().find(|post| post.id == 1).unwrap();
    let md5 = md5_for(1);
    assert_eq!(
        post.file_url("https://static.example.net/data"),
        Some(format!(
            "https://static.example.net/data/{}/{}/{}.jpg",
            &md5[0..2],
            &md5[2..4],
            md5
        ))
    );
}

#[test]
fn test_save_csv_re_exports_matches() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "posts.csv.gz", &sample_posts_csv());
    let store = PostStore::load(&path, &Prefilter::default()).unwrap();

    let parsed = query::parse("+bear").unwrap();
    let evaluation = store.evaluate(&parsed);
    assert_eq!(evaluation.len(), 2);

    let out = dir.path().join("bears.csv");
    PostStore::write_csv(&out, &evaluation.matches).unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    let mut lines = contents.lines();
    let header = lines.next().unwrap();
    assert!(header.contains("tag_string"));
    assert_eq!(lines.count(), 2);
    assert!(contents.contains("bear forest wolf"));
}

#[test]
fn test_malformed_numeric_column_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = String::from(POSTS_HEADER);
    csv.push('\n');
    csv.push_str(&format!(
        "1,100,2024-01-01 00:00:00,{},,s,800,not-a-number,wolf,3,jpg,1000,,f,f,f,5,-1\n",
        md5_for(1)
    ));
    let path = write_gz(dir.path(), "posts.csv.gz", &csv);

    assert!(PostStore::load(&path, &Prefilter::default()).is_err());
}

#[test]
fn test_unsatisfiable_query_yields_nothing_against_real_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(dir.path(), "posts.csv.gz", &sample_posts_csv());
    let store = PostStore::load(&path, &Prefilter::default()).unwrap();

    let parsed = query::parse("+wolf -wolf").unwrap();
    assert!(parsed.is_unsatisfiable());
    assert!(store.evaluate(&parsed).is_empty());
}

#[test]
fn test_tag_index_load_and_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let tags_csv = "\
id,name,category,post_count
1,wolf,5,500
2,fox,5,900
3,forest,0,300
4,conditional_dnp,7,40
";
    let path = write_gz(dir.path(), "tags.csv.gz", tags_csv);

    let index = TagIndex::load(&path).unwrap();
    assert_eq!(index.len(), 4);

    let wolf = index.get("wolf").unwrap();
    assert_eq!(wolf.post_count, 500);
    assert_eq!(wolf.category.name(), "species");

    let species = index.by_category("species".parse().unwrap(), 1);
    let names: Vec<&str> = species.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["fox", "wolf"]);
}
