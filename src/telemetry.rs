use prometheus::{register_counter, register_counter_vec, Counter, CounterVec};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUIZ_QUESTIONS_SERVED: CounterVec = register_counter_vec!(
        "quiz_questions_served_total",
        "Number of questions served by the quiz endpoint",
        &["category"]
    )
    .unwrap();
    pub static ref QUESTIONS_CREATED: Counter = register_counter!(
        "questions_created_total",
        "Number of questions created through the API"
    )
    .unwrap();
    pub static ref QUESTIONS_DELETED: Counter = register_counter!(
        "questions_deleted_total",
        "Number of questions deleted through the API"
    )
    .unwrap();
}

/// Installs the global subscriber.
///
/// `LOG_LEVEL` takes an `EnvFilter` directive; `default_directive` applies when it is unset or
/// unparsable. `INCLUDE_SPAN_EVENTS=true` also logs span enter/exit.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let span_events = if flag_enabled(std::env::var("INCLUDE_SPAN_EVENTS").ok().as_deref()) {
        FmtSpan::ENTER | FmtSpan::EXIT
    } else {
        FmtSpan::NONE
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_span_events(span_events))
        .try_init();
    if installed.is_err() {
        tracing::debug!("Tracing subscriber was already installed");
    }
}

fn flag_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1"))
}

#[cfg(test)]
mod tests {
    use super::flag_enabled;

    #[test]
    fn span_event_flag() {
        assert!(flag_enabled(Some("true")));
        assert!(flag_enabled(Some(" TRUE ")));
        assert!(flag_enabled(Some("1")));
        assert!(!flag_enabled(Some("false")));
        assert!(!flag_enabled(Some("")));
        assert!(!flag_enabled(None));
    }
}
