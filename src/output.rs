use std::io::{self, Write};

use crate::entry::PathEntry;
use crate::error::ScanError;
use crate::results::KindCounts;
use crate::scanner::ScanStream;

// ---------------------------------------------------------------------------
// Draining
// ---------------------------------------------------------------------------

/// Consume both streams of a scan until they close.
///
/// Entry batches are handed to `on_batch` as they arrive; errors are
/// collected and returned. Both streams are polled together, so a burst of
/// errors never stalls the entry side or the other way round.
///
/// If `on_batch` fails, draining stops and the receivers are dropped, which
/// cancels the rest of the scan.
pub async fn drain<F>(stream: ScanStream, mut on_batch: F) -> io::Result<Vec<ScanError>>
where
    F: FnMut(Vec<PathEntry>) -> io::Result<()>,
{
    let (mut entries, mut errors) = stream.into_parts();
    let mut collected = Vec::new();
    let mut entries_open = true;
    let mut errors_open = true;

    while entries_open || errors_open {
        tokio::select! {
            batch = entries.recv(), if entries_open => match batch {
                Some(batch) => on_batch(batch)?,
                None        => entries_open = false,
            },
            err = errors.recv(), if errors_open => match err {
                Some(err) => collected.push(err),
                None      => errors_open = false,
            },
        }
    }

    Ok(collected)
}

/// Drain a scan into memory. Meant for tests and small trees.
pub async fn collect(stream: ScanStream) -> (Vec<PathEntry>, Vec<ScanError>) {
    let mut all = Vec::new();
    let errors = drain(stream, |batch| {
        all.extend(batch);
        Ok(())
    })
    .await
    .unwrap_or_default();
    (all, errors)
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

/// What a printer saw while draining a scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub counts: KindCounts,
    pub errors: Vec<ScanError>,
}

/// Renders a scan as a per-kind count or as a flat listing.
pub struct TreePrinter<W> {
    writer: W,
}

impl<W: Write> TreePrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Drain `stream`, then print `<kind plural>: <n>` for every kind seen,
    /// followed by the total.
    pub async fn print_count(&mut self, stream: ScanStream) -> io::Result<ScanReport> {
        let mut counts = KindCounts::default();
        let errors = drain(stream, |batch| {
            for entry in &batch {
                counts.record(entry.kind());
            }
            Ok(())
        })
        .await?;

        write_counts(&mut self.writer, &counts)?;
        Ok(ScanReport { counts, errors })
    }

    /// Print `<indicator> <path>` for each entry as it arrives.
    pub async fn print_list(&mut self, stream: ScanStream) -> io::Result<ScanReport> {
        let mut counts = KindCounts::default();
        let writer = &mut self.writer;
        let errors = drain(stream, |batch| {
            for entry in &batch {
                counts.record(entry.kind());
                writeln!(writer, "{} {}", entry.kind().indicator(), entry.path().display())?;
            }
            Ok(())
        })
        .await?;

        Ok(ScanReport { counts, errors })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Write the count summary for `counts`.
pub fn write_counts(writer: &mut impl Write, counts: &KindCounts) -> io::Result<()> {
    for (kind, count) in counts.iter() {
        writeln!(writer, "{}: {}", kind.plural(), count)?;
    }
    writeln!(writer, "Total: {}", counts.total())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;

    #[test]
    fn count_summary_format() {
        let mut counts = KindCounts::default();
        counts.record(EntryKind::File);
        counts.record(EntryKind::File);
        counts.record(EntryKind::Dir);
        counts.record(EntryKind::Symlink);

        let mut out = Vec::new();
        write_counts(&mut out, &counts).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Regular files: 2\nDirectories: 1\nSymbolic links: 1\nTotal: 4\n"
        );
    }

    #[test]
    fn empty_counts_print_only_the_total() {
        let mut out = Vec::new();
        write_counts(&mut out, &KindCounts::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Total: 0\n");
    }
}
