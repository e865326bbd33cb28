//! User supplied message templates
//!
//! Templates use tera syntax and see the whole plugin context:
//! `repo`, `build`, `config` and `job`. For example
//!
//! ```text
//! {{ build.status | upper }} {{ repo.owner }}/{{ repo.name }} ({{ build.branch }}) by {{ build.author }}
//! {{ build.message_title }} took {{ build.started | duration(end=build.created) }}
//! ```
//!
//! `build.author` renders the username and `build.message` the raw commit
//! message. Their parts are flattened next to them: `build.author_name`,
//! `build.author_email`, `build.author_avatar`, `build.message_title`,
//! `build.message_body`.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use tera::{Context, Tera, Value};

use crate::error::Result;
use crate::plugin::Plugin;

const TEMPLATE_NAME: &str = "message";
const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render `template` against the plugin context, trimming the output
pub fn render(template: &str, plugin: &Plugin) -> Result<String> {
    let mut tera = Tera::default();
    register_filters(&mut tera);
    tera.add_raw_template(TEMPLATE_NAME, template)?;

    let context = context(plugin)?;
    let rendered = tera.render(TEMPLATE_NAME, &context)?;
    Ok(rendered.trim().to_string())
}

/// Template context with author and message rendered as plain strings
fn context(plugin: &Plugin) -> Result<Context> {
    let mut value = serde_json::to_value(plugin)?;

    if let Some(build) = value.get_mut("build").and_then(Value::as_object_mut) {
        let author = &plugin.build.author;
        let message = &plugin.build.message;
        let flattened = [
            ("author", author.to_string()),
            ("author_username", author.username.clone()),
            ("author_name", author.name.clone()),
            ("author_email", author.email.clone()),
            ("author_avatar", author.avatar.clone()),
            ("message", message.to_string()),
            ("message_title", message.title.clone()),
            ("message_body", message.body.clone()),
        ];
        for (key, text) in flattened {
            build.insert(key.to_string(), Value::String(text));
        }
    }

    Ok(Context::from_value(value)?)
}

fn register_filters(tera: &mut Tera) {
    tera.register_filter("duration", duration_filter);
    tera.register_filter("since", since_filter);
    tera.register_filter("datetime", datetime_filter);
    tera.register_filter("uppercasefirst", uppercasefirst_filter);
}

fn timestamp(value: &Value, filter: &str) -> tera::Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| tera::Error::msg(format!("`{filter}` expects a unix timestamp, got {value}")))
}

/// Human readable length of a span in seconds
fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// `{{ build.started | duration(end=build.created) }}`
fn duration_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let start = timestamp(value, "duration")?;
    let end = match args.get("end") {
        Some(end) => timestamp(end, "duration")?,
        None => Utc::now().timestamp(),
    };
    Ok(Value::String(format_duration(end - start)))
}

/// `{{ build.started | since }}`
fn since_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let start = timestamp(value, "since")?;
    Ok(Value::String(format_duration(Utc::now().timestamp() - start)))
}

/// `{{ build.created | datetime(format="%H:%M", local=true) }}`
fn datetime_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let ts = timestamp(value, "datetime")?;
    let format = match args.get("format") {
        Some(Value::String(f)) => f.as_str(),
        Some(other) => {
            return Err(tera::Error::msg(format!(
                "`datetime` format must be a string, got {other}"
            )))
        }
        None => DEFAULT_DATETIME_FORMAT,
    };
    let local = args.get("local").and_then(Value::as_bool).unwrap_or(false);

    let utc = DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| tera::Error::msg(format!("timestamp out of range: {ts}")))?;
    let rendered = if local {
        utc.with_timezone(&Local).format(format).to_string()
    } else {
        utc.format(format).to_string()
    };
    Ok(Value::String(rendered))
}

fn uppercasefirst_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("`uppercasefirst` expects a string"))?;
    let mut chars = s.chars();
    let out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Ok(Value::String(out))
}
