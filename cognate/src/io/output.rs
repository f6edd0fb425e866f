use std::io::Write;

use anyhow::Context;

use libcognate::multi_align::NodeAlignments;
use libcognate::structs::CognateGroup;

fn tsv_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}

/// Write one row per aligned form: group, language, concept and the aligned
/// symbols separated by spaces. Groups with a single member are skipped.
///
/// Returns the number of groups written.
pub fn write_alignments(alignments: &NodeAlignments, out: impl Write) -> anyhow::Result<usize> {
    let mut writer = tsv_writer(out);
    writer.write_record(["group", "language", "concept", "alignment"])?;

    let mut written = 0;
    for (group_id, alignment) in alignments {
        if alignment.width() < 2 {
            continue;
        }
        let group = group_id.to_string();
        for (row_idx, row) in alignment.rows().iter().enumerate() {
            let symbols: Vec<String> = row.iter().map(|s| s.to_string()).collect();
            writer.write_record([
                group.as_str(),
                alignment.languages[row_idx].as_str(),
                alignment.concepts[row_idx].as_str(),
                symbols.join(" ").as_str(),
            ])?;
        }
        written += 1;
    }

    writer.flush().context("failed to write alignments")?;
    Ok(written)
}

/// Write one row per form of every cognate group.
pub fn write_groups(groups: &[CognateGroup], out: impl Write) -> anyhow::Result<()> {
    let mut writer = tsv_writer(out);
    writer.write_record(["group", "language", "concept", "form"])?;

    for (group_id, group) in groups.iter().enumerate() {
        let group_id = group_id.to_string();
        for form in group {
            writer.write_record([
                group_id.as_str(),
                form.language.as_str(),
                form.concept.as_str(),
                form.transcription().as_str(),
            ])?;
        }
    }

    writer.flush().context("failed to write cognate groups")?;
    Ok(())
}
