//! The parameters of an application, as read by `app_params_get`.

field_enum! {
    /// A parameter of an application.
    pub enum AppParamsField in AppParams {
        AppApprovalProgram = "AppApprovalProgram", 5;
        AppClearStateProgram = "AppClearStateProgram", 5;
        AppGlobalNumUint = "AppGlobalNumUint", 5;
        AppGlobalNumByteSlice = "AppGlobalNumByteSlice", 5;
        AppLocalNumUint = "AppLocalNumUint", 5;
        AppLocalNumByteSlice = "AppLocalNumByteSlice", 5;
        AppExtraProgramPages = "AppExtraProgramPages", 5;
        AppCreator = "AppCreator", 5;
        AppAddress = "AppAddress", 5;
    }
}
