use landfall::{ViewerConfig, run};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = ViewerConfig::load_or_default().and_then(run);
    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
