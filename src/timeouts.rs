pub mod ms {
    pub const POLL_INTERVAL: u64 = 100;
    pub const STEP_PAUSE: u64 = 400;
    pub const BANNER_SETTLE: u64 = 500;
    pub const PROMO_CONFIRM: u64 = 250;
    pub const PROMO_REFLOW_SETTLE: u64 = 300;
    pub const FORCE_HIDE_SETTLE: u64 = 150;
}

pub mod secs {
    pub const VISIBILITY: u64 = 12;
    pub const REQUEST: u64 = 120;
}
