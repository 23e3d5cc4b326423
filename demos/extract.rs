/// 保存済みフィルターの抽出例
///
/// `jira_conf.yaml` のフィルターを解決し、`data/` 以下にCSVを書き出します。
/// 環境変数 (JIRA_URL / JIRA_USER / JIRA_API_TOKEN) があれば設定ファイルより優先します。
///
/// 実行方法：
/// cargo run --example extract                 # 最初のフィルター（サマリー列）
/// cargo run --example extract -- work_done    # フィルター名またはID（詳細列）
/// cargo run --example extract -- -s 12345     # サマリー列
/// cargo run --example extract -- -d 12345     # 詳細列

use dotenv::dotenv;
use jira_extract::config::DEFAULT_CONFIG_FILE;
use jira_extract::{
    ColumnSet, CsvSink, ExtractConfig, ExtractionPipeline, JiraClient, JiraConfig, QuerySource,
};

fn show_usage() {
    println!("Usage:\r\n======");
    println!("  extract");
    println!("  extract \"<filter>\"");
    println!("  extract -s \"<filter>\"");
    println!("  extract -d \"<filter>\"");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ExtractConfig::load(DEFAULT_CONFIG_FILE).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (columns, identifier) = match args.as_slice() {
        [] => match config.first_filter_id() {
            Some(id) => (ColumnSet::Summary, id),
            None => {
                println!("Error: no filters are configured");
                return Ok(());
            }
        },
        [filter] => (ColumnSet::Detail, filter.clone()),
        [flag, filter] if flag == "-d" => (ColumnSet::Detail, filter.clone()),
        [flag, filter] if flag == "-s" => (ColumnSet::Summary, filter.clone()),
        _ => {
            println!("Unknown args: {:?}", args);
            show_usage();
            return Ok(());
        }
    };

    let jira_config = match JiraConfig::from_env() {
        Ok(jira_config) => jira_config,
        Err(_) => config.jira_config()?,
    };
    let client = JiraClient::new(jira_config)?;
    println!("✅ JIRAクライアント準備完了");

    let source = QuerySource::from_identifier(&identifier, &config);
    let sink = CsvSink::new(&config.output_dir);
    let mut pipeline = ExtractionPipeline::from_config(client, &config);

    match pipeline.save_query_data(&source, columns, &sink).await? {
        Some(path) => println!("📄 {} ({})", path.display(), columns.name()),
        None => println!("❌ フィルター {} を解決できませんでした", identifier),
    }

    Ok(())
}
