use anyhow::Result;
use ttrunc_config::Config;
use ttrunc_core::ModelLimit;
use ttrunc_tokens::encoding_for_model;

pub fn handle(json: bool, config: &Config) -> Result<()> {
    let limits: Vec<ModelLimit> = config.model_limits().iter().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&limits)?);
        return Ok(());
    }

    println!("Models:");
    for limit in limits {
        let encoding = encoding_for_model(&limit.model).unwrap_or("unknown");
        println!(
            "  {:<28} {:>8} tokens  ({})",
            limit.model, limit.max_tokens, encoding
        );
    }

    Ok(())
}
