//! Request tags; each becomes an `http_req_duration{name:<tag>}` trend.
pub const LOGIN_INITIAL: &str = "LoginInitial";
pub const IDENTITY_USER_LOGIN: &str = "IdentityUserLogin";
pub const GET_HOME_PAGE: &str = "GetHomePage";
pub const GET_DASHBOARD_PAGE: &str = "GetDashboardPage";
pub const GET_ORIGIN_PAGE: &str = "GetOriginPage";
pub const SUBMIT_ORIGIN_PAGE: &str = "SubmitOriginPage";
pub const COMMODITY_CODE_SELECTION: &str = "CommodityCodeSelection";
pub const SELECT_COMMODITY_SPECIES: &str = "SelectCommoditySpecies";
pub const SAVE_COMMODITY_QUANTITIES: &str = "SaveCommodityQuantities";
pub const CHANGE_COMMODITY_CODE: &str = "ChangeCommodityCode";
pub const SUBMIT_PURPOSE: &str = "SubmitPurpose";
pub const SUBMIT_TRANSPORT_PAGE: &str = "SubmitTransportPage";
pub const GET_REVIEW_PAGE: &str = "GetReviewPage";
pub const SAVE_DRAFT: &str = "SaveDraft";
pub const SUBMIT_NOTIFICATION: &str = "SubmitNotification";
