use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Splits `text` into lines, keeping each line's terminator.
///
/// A line ends at `\n`, `\r\n` or a lone `\r`. Concatenating the returned
/// slices yields `text` exactly.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let ends_line = byte == b'\n' || (byte == b'\r' && bytes.get(i + 1) != Some(&b'\n'));
        if ends_line {
            lines.push(&text[start..=i]);
            start = i + 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

/// Index of the first data row that goes into the second half.
pub fn split_point(data_rows: usize) -> usize {
    data_rows / 2
}

/// A header line and the data rows divided into two contiguous halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<'a> {
    pub header: &'a str,
    pub first: Vec<&'a str>,
    pub second: Vec<&'a str>,
}

impl<'a> Partition<'a> {
    /// Returns `None` when the text has no lines at all.
    pub fn from_text(text: &'a str) -> Option<Self> {
        let lines = split_lines(text);
        let (header, data) = lines.split_first()?;
        let (first, second) = data.split_at(split_point(data.len()));

        Some(Self {
            header: *header,
            first: first.to_vec(),
            second: second.to_vec(),
        })
    }

    pub fn data_rows(&self) -> usize {
        self.first.len() + self.second.len()
    }

    /// Header plus data rows.
    pub fn total_lines(&self) -> usize {
        self.data_rows() + 1
    }

    pub fn render_first(&self) -> String {
        render(self.header, &self.first)
    }

    pub fn render_second(&self) -> String {
        render(self.header, &self.second)
    }
}

fn render(header: &str, rows: &[&str]) -> String {
    let mut out = String::with_capacity(header.len() + rows.iter().map(|r| r.len()).sum::<usize>());
    out.push_str(header);
    for row in rows {
        out.push_str(row);
    }
    out
}

/// Inserts `suffix` between the file stem and its extension.
///
/// `dir/govcontracts2.csv` with suffix `a` becomes `dir/govcontracts2a.csv`.
/// A path without an extension gets the suffix appended.
pub fn half_path(input: &Path, suffix: &str) -> PathBuf {
    let mut file_name: OsString = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    file_name.push(suffix);
    if let Some(extension) = input.extension() {
        file_name.push(".");
        file_name.push(extension);
    }

    input.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_keeps_terminators() {
        let text = "h\r\n1\n2";
        let lines = split_lines(text);
        assert_eq!(lines, vec!["h\r\n", "1\n", "2"]);
        assert_eq!(lines.concat(), text);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_split_lines_on_carriage_returns() {
        assert_eq!(split_lines("h\r1\r2\r"), vec!["h\r", "1\r", "2\r"]);

        let mixed = "h\r\n1\r2\n3\r\n\r4";
        let lines = split_lines(mixed);
        assert_eq!(lines, vec!["h\r\n", "1\r", "2\n", "3\r\n", "\r", "4"]);
        assert_eq!(lines.concat(), mixed);

        assert_eq!(split_lines("é\rü"), vec!["é\r", "ü"]);
    }

    #[test]
    fn test_carriage_return_rows_are_partitioned() {
        let partition = Partition::from_text("id,name\r1,a\r2,b\r3,c\r4,d\r").unwrap();
        assert_eq!(partition.header, "id,name\r");
        assert_eq!(partition.first, vec!["1,a\r", "2,b\r"]);
        assert_eq!(partition.second, vec!["3,c\r", "4,d\r"]);
    }

    #[test]
    fn test_split_point_floors() {
        assert_eq!(split_point(0), 0);
        assert_eq!(split_point(1), 0);
        assert_eq!(split_point(5), 2);
        assert_eq!(split_point(6), 3);
    }

    #[test]
    fn test_five_rows() {
        let text = "id,name\n1,a\n2,b\n3,c\n4,d\n5,e\n";
        let partition = Partition::from_text(text).unwrap();

        assert_eq!(partition.header, "id,name\n");
        assert_eq!(partition.first, vec!["1,a\n", "2,b\n"]);
        assert_eq!(partition.second, vec!["3,c\n", "4,d\n", "5,e\n"]);
        assert_eq!(partition.total_lines(), 6);
        assert_eq!(partition.render_first(), "id,name\n1,a\n2,b\n");
        assert_eq!(partition.render_second(), "id,name\n3,c\n4,d\n5,e\n");
    }

    #[test]
    fn test_halves_reconstruct_data_rows() {
        for n in 0..12 {
            let mut text = String::from("header\n");
            for i in 0..n {
                text.push_str(&format!("row {}\n", i));
            }

            let partition = Partition::from_text(&text).unwrap();
            assert_eq!(partition.first.len(), n / 2);
            assert_eq!(partition.first.len() + partition.second.len(), n);

            let rejoined: String = partition
                .first
                .iter()
                .chain(partition.second.iter())
                .copied()
                .collect();
            assert_eq!(format!("header\n{}", rejoined), text);
        }
    }

    #[test]
    fn test_header_only_and_empty() {
        let partition = Partition::from_text("id,name").unwrap();
        assert_eq!(partition.header, "id,name");
        assert_eq!(partition.data_rows(), 0);
        assert_eq!(partition.render_first(), "id,name");
        assert_eq!(partition.render_second(), "id,name");

        assert!(Partition::from_text("").is_none());
    }

    #[test]
    fn test_half_path() {
        assert_eq!(
            half_path(Path::new("/data/contracts.csv"), "a"),
            PathBuf::from("/data/contractsa.csv")
        );
        assert_eq!(
            half_path(Path::new("/data/govcontracts5.csv"), "b"),
            PathBuf::from("/data/govcontracts5b.csv")
        );
        assert_eq!(
            half_path(Path::new("export.tar.csv"), "_1"),
            PathBuf::from("export.tar_1.csv")
        );
        assert_eq!(
            half_path(Path::new("/data/README"), "a"),
            PathBuf::from("/data/READMEa")
        );
    }
}
