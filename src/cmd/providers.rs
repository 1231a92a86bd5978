use proofmark::check::providers::{BAREUN_API_KEY_ENV, KNOWN_PROVIDERS};
use proofmark::Config;

/// Show every known provider, its place in the chain and whether it can run.
pub fn cmd_providers(config: &Config) {
    let order = &config.check.providers;
    println!("🔎 Checking providers (chain order from config):\n");

    for name in KNOWN_PROVIDERS {
        let position = order.iter().position(|p| p.eq_ignore_ascii_case(name));
        let (ready, detail) = describe(config, name);
        let slot = position.map_or_else(|| "  -".to_string(), |i| format!("{:>3}", i + 1));
        let mark = match (position.is_some(), ready) {
            (true, true) => "✅",
            (true, false) => "⚠️ ",
            (false, _) => "  ",
        };
        println!("{slot} {mark} {name:<8} {detail}");
    }

    for unknown in order
        .iter()
        .filter(|p| !KNOWN_PROVIDERS.iter().any(|k| k.eq_ignore_ascii_case(p)))
    {
        println!("  ? ❌ {unknown:<8} unknown provider, ignored");
    }
}

fn describe(config: &Config, name: &str) -> (bool, String) {
    let providers = &config.providers;
    match name {
        "bareun" => {
            let resolved = providers.bareun.resolved();
            if resolved.api_key.is_some() {
                (true, providers.bareun.endpoint.clone())
            } else {
                (false, format!("no API key (set {BAREUN_API_KEY_ENV})"))
            }
        }
        "naver" => (
            true,
            format!("{} (max {} chars)", providers.naver.endpoint, providers.naver.max_chars),
        ),
        "pusan" => (true, providers.pusan.endpoint.clone()),
        "rules" => (true, "offline regex rules".to_string()),
        _ => (false, String::new()),
    }
}
