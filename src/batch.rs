//! Per-row synthesis of a prompt table into audio files.
//!
//! Every row of the selected column is sent to a [`SynthesisEngine`] once and
//! written to `<output_root>/<label>/<key>.<ext>`. Rows whose value is the
//! literal [`COPY_SENTINEL`] are skipped entirely.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::tabular::{Row, TableError};
use crate::transcript::SoundTable;
use crate::{AudioFormat, SynthesisEngine};

/// Value marking a row whose audio is copied from elsewhere rather than synthesized.
pub const COPY_SENTINEL: &str = "COPY";

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("Table error: {0}")]
    Table(#[from] TableError),
    #[error("Failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Synthesis failed for '{key}': {message}")]
    Synthesis { key: String, message: String },
}

/// Summary of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Rows sent to the engine.
    pub synthesized: usize,
    /// Rows skipped because of the copy sentinel.
    pub skipped: usize,
    /// Characters submitted for synthesis.
    pub characters: usize,
}

/// Output file for one prompt.
///
/// Only the normal components of `label` and `key` are used, so root,
/// `.` and `..` components never move the file outside `root`.
pub fn output_path(root: &Path, label: &str, key: &str, format: AudioFormat) -> PathBuf {
    let file = format!("{key}.{}", format.extension());
    let mut path = root.to_path_buf();
    for part in [Path::new(label), Path::new(&file)] {
        path.extend(part.components().filter(|c| matches!(c, Component::Normal(_))));
    }
    path
}

fn create_dir(path: &Path) -> Result<(), BatchError> {
    fs::create_dir_all(path).map_err(|source| BatchError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Synthesize every row and write the audio below `output_root`.
///
/// Stops at the first failing row.
pub fn synthesize_rows<E, I>(
    engine: &mut E,
    rows: I,
    output_root: &Path,
    label: &str,
    format: AudioFormat,
    params: Option<E::SynthesisParams>,
) -> Result<BatchReport, BatchError>
where
    E: SynthesisEngine,
    E::SynthesisParams: Clone,
    I: IntoIterator<Item = Result<Row, TableError>>,
{
    create_dir(output_root)?;

    let mut report = BatchReport::default();
    for row in rows {
        let Row { index, message } = row?;

        if message == COPY_SENTINEL {
            log::info!("Skipping sound for {index}");
            report.skipped += 1;
            continue;
        }

        let path = output_path(output_root, label, &index, format);
        if let Some(dir) = path.parent() {
            create_dir(dir)?;
        }

        log::debug!("Synthesizing {}", path.display());
        engine
            .synthesize_to_file(&message, &path, format, params.clone())
            .map_err(|e| BatchError::Synthesis {
                key: index.clone(),
                message: e.to_string(),
            })?;

        report.synthesized += 1;
        report.characters += message.chars().count();
    }

    log::info!(
        "Completed successfully, synthesized output for {} messages with {} chars",
        report.synthesized,
        report.characters
    );
    Ok(report)
}

/// Synthesize a parsed table directly, without a CSV round trip.
pub fn synthesize_table<E>(
    engine: &mut E,
    table: &SoundTable,
    output_root: &Path,
    label: &str,
    format: AudioFormat,
    params: Option<E::SynthesisParams>,
) -> Result<BatchReport, BatchError>
where
    E: SynthesisEngine,
    E::SynthesisParams: Clone,
{
    let rows = table.iter().map(|(key, value)| {
        Ok(Row {
            index: key.to_string(),
            message: value.to_string(),
        })
    });
    synthesize_rows(engine, rows, output_root, label, format, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::ColumnReader;
    use crate::transcript::parse;
    use crate::SynthesisResult;

    /// Records every request and answers with one sample per character.
    #[derive(Default)]
    struct RecordingEngine {
        calls: Vec<String>,
        fail_on: Option<String>,
    }

    impl SynthesisEngine for RecordingEngine {
        type SynthesisParams = ();
        type EngineParams = ();

        fn open_with_params(&mut self, _: ()) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }

        fn close(&mut self) {}

        fn synthesize(
            &mut self,
            text: &str,
            _: Option<()>,
        ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
            self.calls.push(text.to_string());
            if self.fail_on.as_deref() == Some(text) {
                return Err("service unavailable".into());
            }
            Ok(SynthesisResult {
                samples: vec![0; text.chars().count()],
                sample_rate: 16000,
            })
        }
    }

    #[test]
    fn copy_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let t = parse(["vm-intro: Welcome", "beep: COPY", "vm-bye: Bye"]).unwrap();
        let mut engine = RecordingEngine::default();

        let report = synthesize_table(
            &mut engine,
            &t.table,
            dir.path(),
            "english",
            AudioFormat::Wav,
            None,
        )
        .unwrap();

        assert_eq!(engine.calls, vec!["Welcome", "Bye"]);
        assert_eq!(
            report,
            BatchReport {
                synthesized: 2,
                skipped: 1,
                characters: 10,
            }
        );
        assert!(dir.path().join("english/vm-intro.wav").is_file());
        assert!(dir.path().join("english/vm-bye.wav").is_file());
        assert!(!dir.path().join("english/beep.wav").exists());
    }

    #[test]
    fn keys_with_slashes_create_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let t = parse(["digits/1: one"]).unwrap();
        let mut engine = RecordingEngine::default();

        synthesize_table(&mut engine, &t.table, dir.path(), "german", AudioFormat::Pcm, None)
            .unwrap();

        let path = output_path(dir.path(), "german", "digits/1", AudioFormat::Pcm);
        assert_eq!(path, dir.path().join("german").join("digits/1.pcm"));
        assert_eq!(std::fs::read(path).unwrap().len(), 6);
    }

    #[test]
    fn absolute_and_parent_keys_stay_under_root() {
        let root = Path::new("/srv/sounds");
        assert_eq!(
            output_path(root, "english", "/tmp/evil", AudioFormat::Wav),
            root.join("english/tmp/evil.wav")
        );
        assert_eq!(
            output_path(root, "english", "../../etc/passwd", AudioFormat::Wav),
            root.join("english/etc/passwd.wav")
        );
        assert_eq!(
            output_path(root, "/german", "./digits/1", AudioFormat::Pcm),
            root.join("german/digits/1.pcm")
        );
    }

    #[test]
    fn absolute_key_is_written_inside_output_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = SoundTable::new();
        table.insert("/escaped".to_string(), "Hi".to_string());
        let mut engine = RecordingEngine::default();

        synthesize_table(&mut engine, &table, dir.path(), "english", AudioFormat::Wav, None)
            .unwrap();

        assert!(dir.path().join("english/escaped.wav").is_file());
    }

    #[test]
    fn synthesis_failure_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let t = parse(["a: fine", "b: broken", "c: never"]).unwrap();
        let mut engine = RecordingEngine {
            fail_on: Some("broken".to_string()),
            ..Default::default()
        };

        let err = synthesize_table(
            &mut engine,
            &t.table,
            dir.path(),
            "english",
            AudioFormat::Wav,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, BatchError::Synthesis { ref key, .. } if key == "b"));
        assert_eq!(engine.calls, vec!["fine", "broken"]);
    }

    #[test]
    fn rows_from_csv_column() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "index,english,german\nvm-intro,Welcome,Willkommen\nbeep,COPY,COPY\n";
        let reader = ColumnReader::from_reader(csv.as_bytes(), "german").unwrap();
        let label = reader.label().to_string();
        let mut engine = RecordingEngine::default();

        let report = synthesize_rows(
            &mut engine,
            reader,
            dir.path(),
            &label,
            AudioFormat::Wav,
            None,
        )
        .unwrap();

        assert_eq!(engine.calls, vec!["Willkommen"]);
        assert_eq!(report.skipped, 1);
        assert!(dir.path().join("german/vm-intro.wav").is_file());
    }
}
