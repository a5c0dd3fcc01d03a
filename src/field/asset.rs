//! The fields of asset holdings and asset parameters.

field_enum! {
    /// A field of an account's holding of an asset, read by
    /// `asset_holding_get`.
    pub enum AssetHoldingField in AssetHolding {
        AssetBalance = "AssetBalance", 2;
        AssetFrozen = "AssetFrozen", 2;
    }
}

field_enum! {
    /// A parameter of an asset, read by `asset_params_get`.
    pub enum AssetParamsField in AssetParams {
        AssetTotal = "AssetTotal", 2;
        AssetDecimals = "AssetDecimals", 2;
        AssetDefaultFrozen = "AssetDefaultFrozen", 2;
        AssetUnitName = "AssetUnitName", 2;
        AssetName = "AssetName", 2;
        AssetURL = "AssetURL", 2;
        AssetMetadataHash = "AssetMetadataHash", 2;
        AssetManager = "AssetManager", 2;
        AssetReserve = "AssetReserve", 2;
        AssetFreeze = "AssetFreeze", 2;
        AssetClawback = "AssetClawback", 2;
        AssetCreator = "AssetCreator", 5;
    }
}
