//! 2軸ガルバノスキャナの光線追跡。
//!
//! スキャンミラーの指令角ごとにRayを光学系に通し、焦点面での到達位置を求める。
//! 指令角の格子でスイープした点群から、走査系の幾何的・機械的な誤差を調べるのに使う。

pub mod cli;
pub mod config;
mod element;
mod error;
mod galvanometer;
mod geometry;
pub mod logger;
pub mod output;
pub mod plot;
mod ray;
mod rotation;
pub mod sweep;

pub use {
    element::{Interaction, Misalignment, OpticalElement, Prescription, ScanChannel, Steering},
    error::{OpticsError, Result},
    galvanometer::{Miss, MultiAxisGalvanometer},
    geometry::{normalize, Plane},
    ray::{Intersection, MissReason, Ray},
    rotation::{rotate_about_axis, rotate_euler_xyz, translate_position},
};
