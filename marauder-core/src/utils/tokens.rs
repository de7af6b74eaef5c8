/// Compact token count: plain below 1000, otherwise one decimal `k`.
pub fn fmt_tokens(count: u64) -> String {
    if count < 1_000 {
        return count.to_string();
    }
    format!("{:.1}k", count as f64 / 1_000.0)
}
