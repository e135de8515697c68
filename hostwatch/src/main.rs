//! Entry point for the hostwatch TUI. Parses args and runs the App.

use std::env;

use hostwatch::app::App;
use url::Url;

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/ws";

enum Parsed {
    Run(String),
    Help(String),
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [ws://HOST:PORT/ws]\n\n\
         Defaults to {DEFAULT_URL}. Press 'q' or Esc to quit."
    )
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Parsed, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "hostwatch".into());
    let mut url: Option<String> = None;

    for arg in it {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Parsed::Help(usage(&prog))),
            _ if arg.starts_with('-') => {
                return Err(format!("unexpected flag '{arg}'\n{}", usage(&prog)))
            }
            _ if url.is_none() => url = Some(arg),
            _ => return Err(format!("unexpected argument '{arg}'\n{}", usage(&prog))),
        }
    }

    let url = url.unwrap_or_else(|| DEFAULT_URL.to_string());
    match Url::parse(&url) {
        Ok(u) if u.scheme() == "ws" => Ok(Parsed::Run(url)),
        // built without a TLS backend for tungstenite
        Ok(u) if u.scheme() == "wss" => Err("wss:// is not supported, use ws://".into()),
        Ok(u) => Err(format!("unsupported scheme '{}', expected ws://", u.scheme())),
        Err(e) => Err(format!("invalid url '{url}': {e}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = match parse_args(env::args()) {
        Ok(Parsed::Run(url)) => url,
        Ok(Parsed::Help(text)) => {
            println!("{text}");
            return Ok(());
        }
        Err(msg) => anyhow::bail!(msg),
    };

    let mut app = App::new();
    app.run(&url).await
}
