pub mod misc {
    pub mod error;
    pub mod log_manager;
    pub mod report;
}

pub mod network {
    pub mod messaging;
    pub mod net_params;
}
