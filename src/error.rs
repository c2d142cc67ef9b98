use thiserror::Error;

/// 光学系の構築や設定読み込みで起きる致命的なエラー。
/// 幾何的にRayが面に当たらないケースはエラーではなく[crate::ray::MissReason]で表す。
#[derive(Error, Debug)]
pub enum OpticsError {
    /// 長さ0のベクトルを方向や法線として使おうとした。
    #[error("degenerate vector: {what} has zero length")]
    DegenerateVector { what: String },

    /// 有限でないパラメータ。
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// プリスクリプションに存在しない光学素子名。
    #[error("unknown optical element `{0}`")]
    UnknownElement(String),

    /// traceの前にRayがセットされていない。
    #[error("no ray is bound to the galvanometer")]
    NoRayBound,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, OpticsError>;
