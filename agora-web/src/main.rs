use agora_client::Config;

mod store;
mod ui;

/// Backend location, as set at build time through `AGORA_BACKEND_URL`
fn config() -> Config {
    let mut config = Config::default();
    if let Some(url) = option_env!("AGORA_BACKEND_URL") {
        config.backend_url = String::from(url);
    }
    config
}

fn main() {
    tracing_wasm::set_as_global_default();
    yew::Renderer::<ui::App>::new().render();
}
