use std::io::Write;

use crate::metrics::ReplicationSummary;

pub(crate) fn write_summaries_impl<W: Write>(
    summaries: &[ReplicationSummary],
    writer: W,
) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(writer, summaries)
}
