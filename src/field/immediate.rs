//! The small enumerations taken as immediates by the cryptographic, encoding
//! and block opcodes introduced from version 5 onwards.

field_enum! {
    /// The elliptic curve used by the `ecdsa_*` opcodes.
    pub enum EcdsaCurve in EcdsaCurve {
        Secp256k1 = "Secp256k1", 5;
        Secp256r1 = "Secp256r1", 7;
    }
}

field_enum! {
    /// The alphabet used by `base64_decode`.
    pub enum Base64Encoding in Base64Encoding {
        URLEncoding = "URLEncoding", 7;
        StdEncoding = "StdEncoding", 7;
    }
}

field_enum! {
    /// The type of value extracted by `json_ref`.
    pub enum JsonRefType in JsonRefType {
        JSONString = "JSONString", 7;
        JSONUint64 = "JSONUint64", 7;
        JSONObject = "JSONObject", 7;
    }
}

field_enum! {
    /// The standard used by `vrf_verify`.
    pub enum VrfStandard in VrfStandard {
        VrfAlgorand = "VrfAlgorand", 7;
    }
}

field_enum! {
    /// A field of a past block header, read by `block`.
    pub enum BlockField in Block {
        BlkSeed = "BlkSeed", 7;
        BlkTimestamp = "BlkTimestamp", 7;
    }
}
