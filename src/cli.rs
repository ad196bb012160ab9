use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracelens_common::ReportTab;

#[derive(Parser)]
#[command(name = "tracelens")]
#[command(about = "TraceLens 画像OSINT解析クライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 解析APIのベースURL（設定ファイルより優先）
    #[arg(long, global = true, env = "TRACELENS_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を解析サービスに送信してレポートを表示
    Analyze {
        /// 画像ファイルのパス
        #[arg(required = true)]
        file: PathBuf,

        /// 表示するタブ (overview/metadata/ocr/ai/search/all)
        #[arg(short, long, default_value = "all")]
        tab: TabSelection,

        /// レポートJSONの保存先ディレクトリ
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// タイムアウト秒数（設定ファイルより優先）
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// 保存済みレポートJSONを表示
    Show {
        /// レポートJSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 表示するタブ (overview/metadata/ocr/ai/search/all)
        #[arg(short, long, default_value = "all")]
        tab: TabSelection,
    },

    /// 設定を表示/編集
    Config {
        /// APIのベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// タイムアウト秒数を設定
        #[arg(long)]
        set_timeout: Option<u64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 表示対象のタブ
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TabSelection {
    #[default]
    All,
    Tab(ReportTab),
}

impl TabSelection {
    pub fn tabs(&self) -> Vec<ReportTab> {
        match self {
            TabSelection::All => ReportTab::ALL.to_vec(),
            TabSelection::Tab(tab) => vec![*tab],
        }
    }
}

impl std::str::FromStr for TabSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(TabSelection::All);
        }
        s.parse::<ReportTab>().map(TabSelection::Tab)
    }
}
