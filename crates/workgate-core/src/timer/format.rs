/// Format seconds as zero-padded `HH:MM:SS`.
///
/// Hours are not wrapped at 24; `100:00:00` is a valid output.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_each_unit() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(61), "00:01:01");
        assert_eq!(format_hms(5400), "01:30:00");
        assert_eq!(format_hms(6000), "01:40:00");
    }

    #[test]
    fn hours_do_not_wrap() {
        assert_eq!(format_hms(360_000), "100:00:00");
    }
}
