pub struct FileSizeUtils;

impl FileSizeUtils {
    /// Binary-prefix size label, e.g. `1536 -> "1.5 KB"`.
    ///
    /// Values are rounded to two decimals and trailing zeros are dropped, so
    /// `1024` reads `"1 KB"` rather than `"1.00 KB"`. Anything past gigabytes
    /// stays in GB.
    pub fn format_size(size: u64) -> String {
        const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
        if size == 0 {
            return format!("0 {}", UNITS[0]);
        }

        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        format!("{} {}", Self::trim_decimals(size), UNITS[unit_index])
    }

    fn trim_decimals(value: f64) -> String {
        let fixed = format!("{:.2}", value);
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        trimmed.to_string()
    }
}
