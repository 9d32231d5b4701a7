//! Interactive CSV picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `sdash` and choose a sales CSV" UX
//!
//! The picker searches for `*.csv` files under the current working directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// What the user answered at the picker prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerChoice {
    File(PathBuf),
    Demo,
    Quit,
    /// Unusable answer; the message is shown and the prompt repeats.
    Retry(String),
}

/// Prompt the user to pick an input from the current directory tree.
///
/// Behavior:
/// - list discovered `*.csv` files
/// - accept a number (from the list), an explicit path, or `d` for demo data
/// - `q` cancels
pub fn prompt_for_input() -> Result<PickerChoice, AppError> {
    let files = discover_csv_files();
    if files.is_empty() {
        println!("No .csv files found under the current directory.");
    } else {
        println!("Found {} CSV file(s):", files.len());
        for (idx, path) in files.iter().enumerate() {
            println!("{:>3}) {}", idx + 1, pretty_path(path));
        }
    }

    loop {
        print!("Select a file by number (1-{}), type a path, `d` for demo data, or `q` to quit: ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Provide a CSV path with `sdash dashboard -f <file.csv>` or try `--demo`.",
            ));
        }

        match parse_choice(&input, &files) {
            PickerChoice::Retry(message) => println!("{message}"),
            choice => return Ok(choice),
        }
    }
}

/// Interpret one line typed at the picker prompt.
pub fn parse_choice(input: &str, files: &[PathBuf]) -> PickerChoice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return PickerChoice::Quit;
    }
    if input.eq_ignore_ascii_case("d") {
        return PickerChoice::Demo;
    }

    if let Ok(choice) = input.parse::<usize>() {
        return match files.get(choice.wrapping_sub(1)) {
            Some(path) => PickerChoice::File(path.clone()),
            None => PickerChoice::Retry(format!(
                "Invalid choice: {choice}. Enter a number between 1 and {}.",
                files.len()
            )),
        };
    }

    match validate_csv_path(Path::new(input)) {
        Ok(path) => PickerChoice::File(path),
        Err(err) => PickerChoice::Retry(err.to_string()),
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            2,
            format!("CSV file not found: {}", path.display()),
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        != Some(true)
    {
        return Err(AppError::new(
            2,
            format!(
                "Expected a .csv file (got: {}). Use -f to pass a CSV path.",
                path.display()
            ),
        ));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
///
/// This is used by both the basic text prompt and the Ratatui TUI.
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

pub fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by(|a, b| pretty_path(a).cmp(&pretty_path(b)));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_csv_files_inner(&path, depth + 1, max_depth, out);
            continue;
        }

        if file_type.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                == Some(true)
        {
            out.push(path);
        }
    }
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

pub fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sdash-picker-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn finds_csvs_and_skips_build_dirs() {
        let dir = scratch_dir("find");
        fs::create_dir_all(dir.join("data")).unwrap();
        fs::create_dir_all(dir.join("target")).unwrap();
        fs::write(dir.join("b.csv"), "x\n").unwrap();
        fs::write(dir.join("data").join("a.CSV"), "x\n").unwrap();
        fs::write(dir.join("target").join("skip.csv"), "x\n").unwrap();
        fs::write(dir.join("notes.txt"), "x\n").unwrap();

        let found = find_csv_files(&dir, DEFAULT_SEARCH_DEPTH);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.CSV".to_string()));
        assert!(names.contains(&"b.csv".to_string()));
    }

    #[test]
    fn parse_choice_handles_numbers_and_commands() {
        let files = vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")];
        assert_eq!(parse_choice("2\n", &files), PickerChoice::File(PathBuf::from("b.csv")));
        assert_eq!(parse_choice(" D ", &files), PickerChoice::Demo);
        assert_eq!(parse_choice("q", &files), PickerChoice::Quit);
        assert!(matches!(parse_choice("0", &files), PickerChoice::Retry(_)));
        assert!(matches!(parse_choice("3", &files), PickerChoice::Retry(_)));
        assert!(matches!(parse_choice("nope.csv", &files), PickerChoice::Retry(_)));
    }

    #[test]
    fn validate_rejects_directories_and_other_extensions() {
        let dir = scratch_dir("validate");
        let txt = dir.join("sales.txt");
        fs::write(&txt, "x\n").unwrap();

        assert_eq!(validate_csv_path(&dir).unwrap_err().exit_code(), 2);
        assert!(validate_csv_path(&txt).unwrap_err().message().contains(".csv"));
        assert!(validate_csv_path(&dir.join("missing.csv")).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
