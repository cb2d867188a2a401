/// Route component constants shared across crates
pub const AUTH_ROUTE_COMPONENT: &str = "auth";
pub const AUTH_ROUTE_PREFIX: &str = const_str::concat!("/", AUTH_ROUTE_COMPONENT);

pub const SIGN_UP_ROUTE_COMPONENT: &str = "sign-up";
pub const SIGN_UP_ROUTE_PREFIX: &str =
    const_str::concat!(AUTH_ROUTE_PREFIX, "/", SIGN_UP_ROUTE_COMPONENT);

pub const LOGIN_ROUTE_COMPONENT: &str = "login";
pub const LOGIN_ROUTE_PREFIX: &str =
    const_str::concat!(AUTH_ROUTE_PREFIX, "/", LOGIN_ROUTE_COMPONENT);

pub const TASK_ROUTE_COMPONENT: &str = "task";
pub const TASK_ROUTE_PREFIX: &str = const_str::concat!("/", TASK_ROUTE_COMPONENT);

pub const CATEGORY_ROUTE_COMPONENT: &str = "category";
pub const CATEGORY_ROUTE_PREFIX: &str = const_str::concat!("/", CATEGORY_ROUTE_COMPONENT);

pub const USER_ROUTE_COMPONENT: &str = "user";
pub const USER_ROUTE_PREFIX: &str = const_str::concat!("/", USER_ROUTE_COMPONENT);

pub const HEALTHCHECK_ROUTE_COMPONENT: &str = "healthcheck";
pub const HEALTHCHECK_ROUTE_PREFIX: &str = const_str::concat!("/", HEALTHCHECK_ROUTE_COMPONENT);
