//! About the enumeration and the natural ordering of the dump files.
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;
use crate::common::error::DispatchError;





/// An ordered sequence of file names residing in one directory, sorted in
/// natural order. Built once per run on the coordinator, broadcast to the
/// other workers, and immutable thereafter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileSet
{
    names: Vec<String>,
}

impl FileSet
{
    /// Build a FileSet from raw names, establishing the natural order.
    pub fn from_names(mut names: Vec<String>) -> Self
    {
        names.sort_by(|a, b| natural_cmp(a, b));

        FileSet
        {
            names,
        }
    }

    /// Enumerate the regular files of a directory (subdirectories are
    /// excluded) in natural order.
    ///
    /// # Parameters
    /// ```text
    /// dir: the directory to enumerate; a missing or non-directory path fails with DirectoryNotFound
    /// ```
    pub fn from_dir(dir: &Path) -> Result<Self, DispatchError>
    {
        if !dir.is_dir()
        {
            return Err(DispatchError::DirectoryNotFound(dir.to_path_buf()));
        }

        let invalid_path = |source| DispatchError::InvalidPath
        {
            path: dir.to_path_buf(),
            source,
        };

        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(dir).map_err(invalid_path)?
        {
            let entry = entry.map_err(invalid_path)?;
            if !entry.path().is_file()
            {
                continue;
            }

            match entry.file_name().into_string()
            {
                Ok(name) => names.push(name),
                Err(name) => return Err(DispatchError::InvalidPath
                {
                    path: dir.join(name),
                    source: io::Error::new(io::ErrorKind::InvalidData, "the file name is not valid UTF-8"),
                }),
            }
        }

        Ok(Self::from_names(names))
    }

    pub fn len(&self) -> usize
    {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String]
    {
        &self.names
    }

    /// The window of `len` consecutive names starting at `start`, or None
    /// when the window runs past the end of the trajectory.
    pub fn window(&self, start: usize, len: usize) -> Option<&[String]>
    {
        self.names.get(start..start.checked_add(len)?)
    }
}





/// Compare two file names in natural order: each name is split into
/// alternating runs of non-digits and digits; non-digit runs compare
/// case-insensitively, digit runs compare numerically (independent of
/// leading zeros and digit count). Names whose runs all compare equal fall
/// back to plain byte order, so the ordering is total and deterministic.
pub fn natural_cmp(a: &str, b: &str) -> Ordering
{
    let mut rest_a = a;
    let mut rest_b = b;

    loop
    {
        if rest_a.is_empty() || rest_b.is_empty()
        {
            // The shorter run sequence is a prefix of the longer one
            let ord = rest_a.len().cmp(&rest_b.len());
            return match ord
            {
                Ordering::Equal => a.cmp(b),
                _ => ord,
            };
        }

        let (text_a, tail_a) = split_text(rest_a);
        let (text_b, tail_b) = split_text(rest_b);
        let ord = text_a.to_lowercase().cmp(&text_b.to_lowercase());
        if ord != Ordering::Equal
        {
            return ord;
        }

        let (digits_a, tail_a) = split_digits(tail_a);
        let (digits_b, tail_b) = split_digits(tail_b);
        let ord = cmp_digit_runs(digits_a, digits_b);
        if ord != Ordering::Equal
        {
            return ord;
        }

        rest_a = tail_a;
        rest_b = tail_b;
    }
}



/// Split off the leading non-digit run.
fn split_text(s: &str) -> (&str, &str)
{
    let end = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Split off the leading digit run.
fn split_digits(s: &str) -> (&str, &str)
{
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Compare two digit runs by numeric value without parsing them, so runs of
/// any length are handled: strip the leading zeros, compare the remaining
/// lengths, then the remaining digits lexicographically. A missing run sorts
/// before any present run.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering
{
    if a.is_empty() || b.is_empty()
    {
        return a.len().cmp(&b.len());
    }

    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}





#[cfg(test)]
mod tests
{
    use super::*;
    use std::fs::File;

    fn sorted(names: &[&str]) -> Vec<String>
    {
        FileSet::from_names(names.iter().map(|s| s.to_string()).collect()).names().to_vec()
    }

    #[test]
    fn digit_runs_compare_numerically()
    {
        assert_eq!(natural_cmp("frame2", "frame10"), Ordering::Less);
        assert_eq!(natural_cmp("frame10", "frame_a"), Ordering::Less);
        assert_ne!(natural_cmp("a10", "a2"), Ordering::Less);
    }

    #[test]
    fn leading_zeros_do_not_change_the_numeric_value()
    {
        assert_eq!(natural_cmp("dumpfile_002", "dumpfile_10"), Ordering::Less);
        assert_eq!(natural_cmp("dumpfile_0100", "dumpfile_20"), Ordering::Greater);
    }

    #[test]
    fn text_runs_compare_case_insensitively()
    {
        assert_eq!(natural_cmp("Frame2", "frame10"), Ordering::Less);
        // Case-equal names fall back to byte order so the sort stays total
        assert_eq!(natural_cmp("FRAME3", "frame3"), Ordering::Less);
    }

    #[test]
    fn digit_runs_longer_than_a_machine_word_are_ordered()
    {
        assert_eq!(
            natural_cmp("frame99999999999999999999999999999998", "frame99999999999999999999999999999999"),
            Ordering::Less,
        );
    }

    #[test]
    fn the_ordering_is_total_and_deterministic()
    {
        // Equal numeric value with different spellings still orders both ways consistently
        let ab = natural_cmp("a01", "a1");
        let ba = natural_cmp("a1", "a01");
        assert_eq!(ab, ba.reverse());
        assert_eq!(natural_cmp("a1", "a1"), Ordering::Equal);
    }

    #[test]
    fn dump_files_sort_by_step_number()
    {
        assert_eq!(
            sorted(&["dumpfile_10000", "dumpfile_0", "dumpfile_2000", "dumpfile_1000"]),
            vec!["dumpfile_0", "dumpfile_1000", "dumpfile_2000", "dumpfile_10000"],
        );
    }

    #[test]
    fn from_dir_enumerates_only_regular_files_in_natural_order()
    {
        let dir = tempfile::tempdir().unwrap();
        for name in ["dumpfile_10", "dumpfile_2", "dumpfile_1"]
        {
            File::create(dir.path().join(name)).unwrap();
        }
        fs::create_dir(dir.path().join("dumpfile_subdir")).unwrap();

        let files = FileSet::from_dir(dir.path()).unwrap();

        assert_eq!(files.names(), ["dumpfile_1", "dumpfile_2", "dumpfile_10"]);
    }

    #[test]
    fn from_dir_fails_on_a_missing_directory()
    {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_dir");

        assert!(matches!(
            FileSet::from_dir(&missing),
            Err(DispatchError::DirectoryNotFound(path)) if path == missing
        ));
    }

    #[test]
    fn from_dir_fails_on_a_file_path()
    {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dumpfile_1");
        File::create(&file).unwrap();

        assert!(matches!(FileSet::from_dir(&file), Err(DispatchError::DirectoryNotFound(_))));
    }

    #[test]
    fn window_is_none_past_the_end()
    {
        let files = FileSet::from_names(vec!["a1".into(), "a2".into(), "a3".into()]);

        assert_eq!(files.window(0, 3).map(<[String]>::len), Some(3));
        assert_eq!(files.window(1, 3), None);
        assert_eq!(files.window(2, 1).map(<[String]>::len), Some(1));
    }
}
