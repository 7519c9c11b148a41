use crate::core::config::data::Config;
use crate::core::session::SessionSettings;

impl Config {
    pub fn print_all(&self, effective: &SessionSettings) {
        print!("{}", self.render_all(effective));
    }

    /// Stored values next to what a session would actually use.
    pub fn render_all(&self, effective: &SessionSettings) -> String {
        let stored = |value: Option<String>| value.unwrap_or_else(|| "(unset)".to_string());
        let mut out = String::from("Current configuration:\n");
        out.push_str(&format!(
            "  model: {} (effective: {})\n",
            stored(self.model.clone()),
            effective.model
        ));
        out.push_str(&format!(
            "  base-url: {} (effective: {})\n",
            stored(self.base_url.clone()),
            effective.base_url
        ));
        out.push_str(&format!(
            "  timeout-secs: {}\n",
            stored(self.timeout_secs.map(|secs| secs.to_string()))
        ));
        let credential = if effective.api_key.is_some() {
            "set"
        } else {
            "missing"
        };
        out.push_str(&format!("  api key: {credential}\n"));
        out
    }
}
