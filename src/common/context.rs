use crate::common::config::AppConfig;
use sqlx::{MySql, Pool};

pub trait Context: Sync + Send {
    fn db(&self) -> &Pool<MySql>;
    fn config(&self) -> &AppConfig;
}
