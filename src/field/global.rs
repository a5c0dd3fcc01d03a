//! The global fields of the ledger, as read by `global`.

field_enum! {
    /// A global value of the ledger or of the executing program.
    pub enum GlobalField in Global {
        MinTxnFee = "MinTxnFee", 1;
        MinBalance = "MinBalance", 1;
        MaxTxnLife = "MaxTxnLife", 1;
        ZeroAddress = "ZeroAddress", 1;
        GroupSize = "GroupSize", 1;
        LogicSigVersion = "LogicSigVersion", 2;
        Round = "Round", 2;
        LatestTimestamp = "LatestTimestamp", 2;
        CurrentApplicationID = "CurrentApplicationID", 2;
        CreatorAddress = "CreatorAddress", 3;
        CurrentApplicationAddress = "CurrentApplicationAddress", 5;
        GroupID = "GroupID", 5;
        OpcodeBudget = "OpcodeBudget", 6;
        CallerApplicationID = "CallerApplicationID", 6;
        CallerApplicationAddress = "CallerApplicationAddress", 6;
        AssetCreateMinBalance = "AssetCreateMinBalance", 10;
        AssetOptInMinBalance = "AssetOptInMinBalance", 10;
        GenesisHash = "GenesisHash", 10;
    }
}

impl GlobalField {
    /// Checks whether the field can only be read by an application.
    #[must_use]
    pub fn is_application_only(self) -> bool {
        matches!(
            self,
            Self::Round
                | Self::LatestTimestamp
                | Self::CurrentApplicationID
                | Self::CreatorAddress
                | Self::CurrentApplicationAddress
                | Self::CallerApplicationID
                | Self::CallerApplicationAddress
        )
    }
}
