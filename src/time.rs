use chrono::Local;

pub fn current_timestamp() -> u64 {
    Local::now().timestamp() as u64
}

/// The local UTC offset, e.g. `+08:00`.
pub fn local_time_zone() -> String {
    Local::now().format("%:z").to_string()
}
