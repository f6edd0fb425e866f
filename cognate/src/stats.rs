use std::fmt::Debug;
use std::io::Write;
use std::time::Duration;

use anyhow::anyhow;
use colored::Colorize;
use strum::{EnumCount, EnumIter, IntoEnumIterator};

#[repr(usize)]
#[derive(Clone, Copy, EnumIter, EnumCount)]
pub enum SerialTimed {
    Total,
    Reading,
    Estimation,
    Clustering,
    MultiAlignment,
}

impl Debug for SerialTimed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            SerialTimed::Total => "total",
            SerialTimed::Reading => "reading",
            SerialTimed::Estimation => "estimation",
            SerialTimed::Clustering => "clustering",
            SerialTimed::MultiAlignment => "multiple alignment",
        };

        write!(f, "{}", str)
    }
}

#[repr(usize)]
#[derive(Clone, Copy, EnumIter, EnumCount)]
pub enum CountedValue {
    Forms,
    CandidatePairs,
    BootstrapDiscarded,
    ReselectedPairs,
    IterationDiscarded,
    AcceptedPairs,
    TableUpdates,
    Iterations,
    CognateGroups,
    AlignedGroups,
}

impl Debug for CountedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            CountedValue::Forms => "word forms",
            CountedValue::CandidatePairs => "similar candidate pairs",
            CountedValue::BootstrapDiscarded => "discarded while bootstrapping",
            CountedValue::ReselectedPairs => "re-selected pairs",
            CountedValue::IterationDiscarded => "discarded while iterating",
            CountedValue::AcceptedPairs => "accepted pairs",
            CountedValue::TableUpdates => "score table updates",
            CountedValue::Iterations => "iterations",
            CountedValue::CognateGroups => "cognate groups",
            CountedValue::AlignedGroups => "aligned groups",
        };

        write!(f, "{}", str)
    }
}

#[derive(Clone, Default)]
pub struct Stats {
    serial_times: [Duration; SerialTimed::COUNT],
    counted_values: [usize; CountedValue::COUNT],
}

impl Stats {
    pub fn set_serial_time(&mut self, timed: SerialTimed, time: Duration) {
        self.serial_times[timed as usize] = time;
    }

    pub fn set_count(&mut self, counted: CountedValue, count: usize) {
        self.counted_values[counted as usize] = count;
    }

    pub fn add_count(&mut self, counted: CountedValue, count: usize) {
        self.counted_values[counted as usize] += count;
    }

    pub fn increment_count(&mut self, counted: CountedValue) {
        self.add_count(counted, 1);
    }

    pub fn counted_value(&self, counted: CountedValue) -> usize {
        self.counted_values[counted as usize]
    }

    fn serial_time_total(&self, timed: SerialTimed) -> Duration {
        self.serial_times[timed as usize]
    }

    fn serial_string(&self, timed: SerialTimed) -> String {
        let total = self.serial_time_total(SerialTimed::Total).as_secs_f64();
        let width = format!("{total:.2}").len();
        let time = self.serial_time_total(timed).as_secs_f64();
        let pct = if total > 0.0 { time / total * 100.0 } else { 0.0 };

        format!("{time:w$.2}s ({pct:>5.2}%)", w = width)
    }

    fn write_tree<T: Debug>(
        out: &mut impl Write,
        entries: &[(T, String)],
    ) -> anyhow::Result<()> {
        let max_width = entries
            .iter()
            .map(|(label, value)| format!("{label:?}: {value}").len())
            .max()
            .unwrap_or(0);

        let (last, rest) = entries
            .split_last()
            .ok_or(anyhow!("no entries to write in Stats::write_tree()"))?;

        for (label, value) in rest {
            let label = format!("{label:?}");
            let w = max_width.saturating_sub(label.len() + 2);
            writeln!(out, " ├─ {label}: {value:>w$}")?;
        }
        let label = format!("{:?}", last.0);
        let w = max_width.saturating_sub(label.len() + 2);
        writeln!(out, " └─ {label}: {:>w$}", last.1)?;
        Ok(())
    }

    pub fn write(&self, out: &mut impl Write) -> anyhow::Result<()> {
        writeln!(out, "{}", "summary statistics:".bold())?;
        let counts: Vec<(CountedValue, String)> = CountedValue::iter()
            .filter(|&c| self.counted_value(c) > 0)
            .map(|c| (c, self.counted_value(c).to_string()))
            .collect();
        if !counts.is_empty() {
            Self::write_tree(out, &counts)?;
        }
        writeln!(out)?;

        writeln!(
            out,
            "{} {}",
            "runtime:".bold(),
            self.serial_string(SerialTimed::Total)
        )?;
        let times: Vec<(SerialTimed, String)> = SerialTimed::iter()
            .skip(1)
            .filter(|&t| !self.serial_time_total(t).is_zero())
            .map(|t| (t, self.serial_string(t)))
            .collect();
        if !times.is_empty() {
            Self::write_tree(out, &times)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_write_stats() -> anyhow::Result<()> {
        colored::control::set_override(false);

        let mut stats = Stats::default();
        stats.set_count(CountedValue::Forms, 120);
        stats.increment_count(CountedValue::Iterations);
        stats.add_count(CountedValue::Iterations, 2);
        stats.set_serial_time(SerialTimed::Total, Duration::from_secs(4));
        stats.set_serial_time(SerialTimed::Estimation, Duration::from_secs(1));

        let mut buffer: Vec<u8> = vec![];
        stats.write(&mut buffer)?;
        let text = String::from_utf8(buffer)?;

        check!(stats.counted_value(CountedValue::Iterations) == 3);
        check!(text.contains(" ├─ word forms: 120"));
        check!(text.contains(" └─ iterations:   3"));
        check!(text.contains("runtime: 4.00s (100.00%)"));
        check!(text.contains(" └─ estimation: 1.00s (25.00%)"));
        Ok(())
    }
}
