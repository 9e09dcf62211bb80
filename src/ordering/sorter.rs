use crate::discovery::FileRecord;

use super::natural::natural_cmp;

/// Sorts records by entry name in natural order
///
/// The sort is stable: records whose names compare equal keep their
/// discovery order.
pub fn sort_records(records: &mut [FileRecord]) {
    records.sort_by(|a, b| natural_cmp(a.name(), b.name()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(path: &str, name: &str) -> FileRecord {
        FileRecord::new(PathBuf::from(path), name.to_string())
    }

    #[test]
    fn test_sort_records_by_natural_name() {
        let mut records = vec![
            record("b/file2.mp3", "b_file2.mp3"),
            record("b/file10.mp3", "b_file10.mp3"),
            record("b/file1.mp3", "b_file1.mp3"),
        ];

        sort_records(&mut records);

        let names: Vec<&str> = records.iter().map(FileRecord::name).collect();
        assert_eq!(names, vec!["b_file1.mp3", "b_file2.mp3", "b_file10.mp3"]);
    }

    #[test]
    fn test_sort_records_is_stable() {
        // Same entry name from two different paths, e.g. "a/b_c.mp3" and "a_b/c.mp3"
        let mut records = vec![
            record("first/a_b.mp3", "x_a_b.mp3"),
            record("z/track1.mp3", "x_track1.mp3"),
            record("second/a/b.mp3", "x_a_b.mp3"),
        ];

        sort_records(&mut records);

        let paths: Vec<PathBuf> = records.iter().map(|r| r.path().to_path_buf()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("first/a_b.mp3"),
                PathBuf::from("second/a/b.mp3"),
                PathBuf::from("z/track1.mp3"),
            ]
        );
    }
}
