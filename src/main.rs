use gumdrop::Options;
use std::process;

use flowload::config::{check_summary, FlowloadConfiguration};
use flowload::FlowError;

async fn flowload_main() -> Result<(), FlowError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let configuration = FlowloadConfiguration::parse(&args)?;
    if configuration.help {
        println!("{}", FlowloadConfiguration::usage());
        return Ok(());
    }

    let flow_set = configuration.flow_set()?;
    if configuration.check {
        print!("{}", check_summary(&flow_set));
        return Ok(());
    }

    flowload::run(&flow_set, configuration.goose_configuration()?).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = flowload_main().await {
        eprintln!("{}", e);
        process::exit(1);
    }
}
