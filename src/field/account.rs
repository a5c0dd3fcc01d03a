//! The parameters of an account, as read by `acct_params_get`.

field_enum! {
    /// A parameter of an account.
    pub enum AcctParamsField in AcctParams {
        AcctBalance = "AcctBalance", 6;
        AcctMinBalance = "AcctMinBalance", 6;
        AcctAuthAddr = "AcctAuthAddr", 6;
        AcctTotalNumUint = "AcctTotalNumUint", 8;
        AcctTotalNumByteSlice = "AcctTotalNumByteSlice", 8;
        AcctTotalExtraAppPages = "AcctTotalExtraAppPages", 8;
        AcctTotalAppsCreated = "AcctTotalAppsCreated", 8;
        AcctTotalAppsOptedIn = "AcctTotalAppsOptedIn", 8;
        AcctTotalAssetsCreated = "AcctTotalAssetsCreated", 8;
        AcctTotalAssets = "AcctTotalAssets", 8;
        AcctTotalBoxes = "AcctTotalBoxes", 8;
        AcctTotalBoxBytes = "AcctTotalBoxBytes", 8;
    }
}
