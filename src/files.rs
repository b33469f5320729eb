//! Input file discovery.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Default audio file extensions recognised by [`find_audio_files`].
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["aac", "au", "flac", "m4a", "mp3", "ogg", "wav"];

/// Get a sorted list of audio files directly inside `directory`.
///
/// Subdirectories are not descended into. Extensions match
/// case-insensitively.
///
/// # Arguments
/// * `directory` - Path to look for files; a leading `~/` expands to `$HOME`
/// * `ext` - File extensions to include. `None` uses [`DEFAULT_AUDIO_EXTENSIONS`]
///
/// # Errors
/// Returns the I/O error when `directory` cannot be read.
///
/// # Examples
/// ```no_run
/// use phrasecut::files::find_audio_files;
///
/// let wavs = find_audio_files("./corpus", Some(&["wav"])).unwrap();
/// ```
pub fn find_audio_files<P: AsRef<Path>>(
    directory: P,
    ext: Option<&[&str]>,
) -> std::io::Result<Vec<PathBuf>> {
    let extensions = ext.unwrap_or(DEFAULT_AUDIO_EXTENSIONS);
    let dir_path = expand_tilde(directory.as_ref());

    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(&dir_path)? {
        let path = entry?.path();
        if path.is_file() && matches_extension(&path, extensions) {
            files.insert(path);
        }
    }
    Ok(files.into_iter().collect())
}

/// Base name used for the clips of `source`: its file stem.
pub fn output_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string())
}

/// Base names for a batch of sources, one per file and pairwise distinct.
///
/// Sources whose stems collide (ignoring case, e.g. `take.wav` and
/// `take.FLAC`) keep their extension in the name.
///
/// # Example
/// ```
/// use phrasecut::files::output_names;
/// use std::path::PathBuf;
///
/// let files = [PathBuf::from("take.flac"), PathBuf::from("take.wav"), PathBuf::from("intro.mp3")];
/// assert_eq!(output_names(&files), ["take.flac", "take.wav", "intro"]);
/// ```
pub fn output_names(sources: &[PathBuf]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for source in sources {
        *counts.entry(output_name(source).to_lowercase()).or_default() += 1;
    }
    sources
        .iter()
        .map(|source| {
            let stem = output_name(source);
            match source.file_name() {
                Some(name) if counts[&stem.to_lowercase()] > 1 => {
                    name.to_string_lossy().into_owned()
                }
                _ => stem,
            }
        })
        .collect()
}

/// Output file name for the `index`-th clip (1-based) of the source named `name`.
///
/// # Example
/// ```
/// use phrasecut::files::part_file_name;
///
/// assert_eq!(part_file_name("talk", 7), "talk_part007.wav");
/// ```
pub fn part_file_name(name: &str, index: usize) -> String {
    format!("{name}_part{index:03}.wav")
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    path.to_path_buf()
}

fn matches_extension(path: &Path, extensions: &[&str]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(e) => extensions.iter().any(|x| x.eq_ignore_ascii_case(e)),
        None => false,
    }
}
