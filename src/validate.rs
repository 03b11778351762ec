// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The validation orchestrator.
//!
//! [`Validator`] composes the metadata locator, the region arithmetic, the
//! anti-rollback counter, the trailer locator, and the injected
//! [`Verifier`] into the single decision "is this image safe to run". The
//! decision is a short-circuiting checklist in which every step fails
//! closed; the caller gets a plain boolean verdict, and nothing is retried.
//! A failed validation is definitive for that call — only a fresh call with
//! potentially different inputs may be attempted.
//!
//! There are two entry points:
//! - [`Validator::validate_local`] for an image resident at the address it
//!   will run from, and
//! - [`Validator::validate`] for an image staged elsewhere (e.g. a staging
//!   slot) and relocated by an external loader before execution.
//!
//! The second relaxes the source-equals-destination requirement but still
//! enforces every address, region, and version check against the
//! *destination* address. It also suppresses all diagnostics, to avoid
//! leaking verification detail to a less-trusted caller.
//!
//! Note that a successful validation does not bump the monotonic counter:
//! deciding to boot (and therefore to ratchet the counter forward) is the
//! caller's separate decision, made through [`Validator::counter_mut`].

use crate::hardware::flash;
use crate::hardware::flash::Image;
use crate::hardware::storage;
use crate::hardware::storage::CounterStorage;
use crate::hardware::storage::MonotonicCounter;
use crate::image::info;
use crate::image::trailer;
use crate::image::FwInfo;
use crate::mem::region_within;
use crate::mem::within;
use crate::verify;
use crate::verify::Verifier;

/// The default trailer search distance, in bytes.
///
/// Covers word-alignment padding between the firmware body and its trailer;
/// the scan probes `search_distance + 1` positions.
pub const DEFAULT_SEARCH_DISTANCE: u32 = 4;

/// A validation error.
///
/// The caller of the public entry points only ever sees a boolean; this
/// type exists so that rejections can be logged (for local validation) and
/// asserted on in tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// No metadata structure was found where one was expected.
    MissingInfo,

    /// The metadata's claimed address is not the destination address.
    WrongAddress,

    /// A locally-resident image was presented with distinct source and
    /// destination addresses.
    SourceMismatch,

    /// Re-locating the metadata from the source address did not yield the
    /// structure under consideration.
    InfoMismatch,

    /// The image was explicitly invalidated in place.
    Invalidated,

    /// The claimed version does not fit the monotonic counter's range.
    VersionRange,

    /// The claimed version is older than the monotonic counter: a rollback
    /// attempt.
    Rollback,

    /// The claimed sizes are inconsistent or exceed a slot capacity.
    BadSize,

    /// The signed region does not contain the executable image.
    SignedRegion,

    /// The boot address lies outside the executable image.
    BootAddress,

    /// The reset-handler word following the boot address is unreadable or
    /// points outside the executable image.
    ResetVector,

    /// No validation-info trailer was found within the search window.
    MissingTrailer,

    /// The trailer's claimed address does not match the metadata's: it does
    /// not belong to this image.
    TrailerMismatch,

    /// The anti-rollback counter could not be read. Enabled-but-unreadable
    /// monotonic state is never trusted.
    Counter(storage::Error),

    /// An image access fell out of bounds.
    Flash(flash::Error),

    /// The verification policy rejected the image.
    Verify(verify::Error),
}

impl From<storage::Error> for Error {
    fn from(e: storage::Error) -> Self {
        Self::Counter(e)
    }
}

impl From<flash::Error> for Error {
    fn from(e: flash::Error) -> Self {
        Self::Flash(e)
    }
}

impl From<verify::Error> for Error {
    fn from(e: verify::Error) -> Self {
        Self::Verify(e)
    }
}

/// Static configuration for a [`Validator`].
#[derive(Copy, Clone, Debug)]
pub struct Config {
    /// The capacities of the two firmware slots, in bytes. An acceptable
    /// image must fit in *both*, so that it stays updatable via either.
    pub slot_sizes: (u32, u32),

    /// The offset of the metadata structure from the image base.
    pub info_offset: u32,

    /// The trailer search distance; see [`DEFAULT_SEARCH_DISTANCE`].
    pub search_distance: u32,
}

impl Config {
    /// Creates a `Config` with the given slot capacities and the default
    /// metadata-at-image-start layout.
    pub fn new(s0_size: u32, s1_size: u32) -> Self {
        Self {
            slot_sizes: (s0_size, s1_size),
            info_offset: 0,
            search_distance: DEFAULT_SEARCH_DISTANCE,
        }
    }
}

/// The validation orchestrator.
///
/// Owns the verification policy and the anti-rollback counter for the
/// duration of the boot decision. See the [module documentation](self).
pub struct Validator<V, C> {
    verifier: V,
    counter: MonotonicCounter<C>,
    config: Config,
}

impl<V: Verifier, C: CounterStorage> Validator<V, C> {
    /// Creates a new `Validator`.
    pub fn new(
        verifier: V,
        counter: MonotonicCounter<C>,
        config: Config,
    ) -> Self {
        Self {
            verifier,
            counter,
            config,
        }
    }

    /// Returns the anti-rollback counter.
    pub fn counter(&self) -> &MonotonicCounter<C> {
        &self.counter
    }

    /// Returns the anti-rollback counter, for the post-boot-decision bump.
    pub fn counter_mut(&mut self) -> &mut MonotonicCounter<C> {
        &mut self.counter
    }

    /// Locates the firmware metadata in `image`, per this validator's
    /// configured layout.
    pub fn find_info(&self, image: &Image) -> Option<FwInfo> {
        FwInfo::find(image, self.config.info_offset)
    }

    /// Validates an image resident at the address it will run from.
    ///
    /// `info` is the image's metadata, as located by [`find_info`]; it is
    /// re-located and cross-checked as part of validation, so a stale or
    /// forged value cannot vouch for the image.
    ///
    /// [`find_info`]: Self::find_info
    pub fn validate_local(&mut self, image: &Image, info: &FwInfo) -> bool {
        match self.run(image.base(), image, info, false) {
            Ok(()) => {
                info!("firmware at {:#010x} accepted", image.base());
                true
            }
            Err(e) => {
                error!(
                    "firmware at {:#010x} rejected: {:?}",
                    image.base(),
                    e
                );
                false
            }
        }
    }

    /// Validates an externally-staged image that will run from
    /// `fw_dst_address` after relocation.
    ///
    /// All address, region, and version checks are made against the
    /// destination; only the source-equals-destination requirement is
    /// relaxed. Diagnostics are suppressed entirely on this path.
    pub fn validate(&mut self, fw_dst_address: u32, image: &Image) -> bool {
        let info = match self.find_info(image) {
            Some(info) => info,
            None => return false,
        };
        self.run(fw_dst_address, image, &info, true).is_ok()
    }

    fn run(
        &mut self,
        dst: u32,
        image: &Image,
        fw_info: &FwInfo,
        external: bool,
    ) -> Result<(), Error> {
        let src = image.base();

        if fw_info.address != dst {
            return Err(Error::WrongAddress);
        }

        if !external && src != dst {
            return Err(Error::SourceMismatch);
        }

        // The metadata must be locatable from the source address and
        // identical to what the caller handed us; a forged copy placed
        // elsewhere must not vouch for code at its copied location.
        let relocated =
            self.find_info(image).ok_or(Error::MissingInfo)?;
        if relocated != *fw_info {
            return Err(Error::InfoMismatch);
        }

        if fw_info.valid != info::VALID_VALUE {
            return Err(Error::Invalidated);
        }

        if fw_info.version > u32::from(storage::MAX_VERSION) {
            return Err(Error::VersionRange);
        }
        let (current, _) = self.counter.get()?;
        if fw_info.version < u32::from(current) {
            return Err(Error::Rollback);
        }

        let (s0_size, s1_size) = self.config.slot_sizes;
        if fw_info.size > s0_size
            || fw_info.size > s1_size
            || fw_info.total_size < fw_info.size
        {
            return Err(Error::BadSize);
        }

        // The signed region is anchored at the metadata structure and must
        // contain the whole executable image. All ends are computed
        // checked; a wrapped range fails closed.
        let image_end =
            src.checked_add(fw_info.size).ok_or(Error::BadSize)?;
        let info_addr = src
            .checked_add(self.config.info_offset)
            .ok_or(Error::SignedRegion)?;
        let signed_end = info_addr
            .checked_add(fw_info.total_size)
            .ok_or(Error::SignedRegion)?;
        if !region_within(src, image_end, info_addr, signed_end) {
            return Err(Error::SignedRegion);
        }

        let exec_end =
            dst.checked_add(fw_info.size).ok_or(Error::BadSize)?;
        if !within(fw_info.boot_address, dst, exec_end) {
            return Err(Error::BootAddress);
        }
        // The reset-handler word sits right after the entry thunk. It is
        // read through the checked image view at the source-relative copy
        // of `boot_address` (which is >= `dst`, per the check above), and
        // its value must point back into the destination region.
        let reset_slot = src
            .checked_add(fw_info.boot_address - dst)
            .and_then(|addr| addr.checked_add(4))
            .ok_or(Error::ResetVector)?;
        let reset_vector = image
            .read_u32(reset_slot)
            .map_err(|_| Error::ResetVector)?;
        if !within(reset_vector, dst, exec_end) {
            return Err(Error::ResetVector);
        }

        let trailer =
            trailer::find(image, image_end, self.config.search_distance)
                .ok_or(Error::MissingTrailer)?;
        if trailer.address() != fw_info.address {
            return Err(Error::TrailerMismatch);
        }

        let firmware = image.read(src, fw_info.size)?;
        self.verifier.verify(firmware, &trailer, external)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use zerocopy::AsBytes;

    use crate::hardware::storage::RamCounter;
    use crate::hardware::storage::RamKeyStore;
    use crate::hardware::storage::Slot;
    use crate::image::info::RawFwInfo;
    use crate::image::info::FIRMWARE_INFO_MAGIC;
    use crate::image::trailer::RawValidationInfo;
    use crate::image::trailer::VALIDATION_INFO_MAGIC;
    use crate::image::Le32;
    use crate::verify::fake;
    use crate::verify::SignatureVerifier;

    /// A `Verifier` with a fixed verdict, for exercising the checklist in
    /// front of it.
    struct FixedVerifier {
        verdict: Result<(), verify::Error>,
        calls: usize,
        last_external: Option<bool>,
    }

    impl FixedVerifier {
        fn ok() -> Self {
            Self {
                verdict: Ok(()),
                calls: 0,
                last_external: None,
            }
        }

        fn failing() -> Self {
            Self {
                verdict: Err(verify::Error::NoTrustedKey),
                calls: 0,
                last_external: None,
            }
        }
    }

    impl Verifier for &mut FixedVerifier {
        fn verify(
            &mut self,
            _: &[u8],
            _: &crate::image::ValidationInfo,
            external: bool,
        ) -> Result<(), verify::Error> {
            self.calls += 1;
            self.last_external = Some(external);
            self.verdict
        }
    }

    /// Knobs for building a test image; the defaults describe a well-formed
    /// image at `0x8000` that every checklist step accepts.
    struct TestImage {
        address: u32,
        size: u32,
        total_size: u32,
        version: u32,
        boot_address: u32,
        reset_vector: u32,
        valid: u32,
        trailer_address: u32,
        trailer_pad: u32,
    }

    const DST: u32 = 0x8000;
    const SIZE: u32 = 0x1000;

    impl Default for TestImage {
        fn default() -> Self {
            Self {
                address: DST,
                size: SIZE,
                total_size: SIZE + 0x10,
                version: 3,
                boot_address: DST + 0x40,
                reset_vector: DST + 0x100,
                valid: info::VALID_VALUE,
                trailer_address: DST,
                trailer_pad: 0,
            }
        }
    }

    impl TestImage {
        fn build(&self) -> Vec<u8> {
            let raw_info = RawFwInfo {
                magic: [
                    Le32::new(FIRMWARE_INFO_MAGIC[0]),
                    Le32::new(FIRMWARE_INFO_MAGIC[1]),
                    Le32::new(FIRMWARE_INFO_MAGIC[2]),
                ],
                size: Le32::new(self.size),
                total_size: Le32::new(self.total_size),
                version: Le32::new(self.version),
                address: Le32::new(self.address),
                boot_address: Le32::new(self.boot_address),
                valid: Le32::new(self.valid),
            };
            let raw_trailer = RawValidationInfo {
                magic: [
                    Le32::new(VALIDATION_INFO_MAGIC[0]),
                    Le32::new(VALIDATION_INFO_MAGIC[1]),
                    Le32::new(VALIDATION_INFO_MAGIC[2]),
                ],
                address: Le32::new(self.trailer_address),
                hash: [0xaa; 32],
                public_key: [0xbb; 64],
                signature: [0xcc; 64],
            };

            let mut bytes = vec![0u8; self.size as usize];
            bytes[..info::INFO_LEN].copy_from_slice(raw_info.as_bytes());
            // Plant the reset-handler word after the entry thunk, when the
            // thunk actually lands inside the body.
            let reset_off =
                self.boot_address.wrapping_sub(self.address) as usize + 4;
            if reset_off + 4 <= bytes.len() {
                bytes[reset_off..reset_off + 4]
                    .copy_from_slice(&self.reset_vector.to_le_bytes());
            }
            bytes.extend(core::iter::repeat(0xff).take(self.trailer_pad as usize));
            bytes.extend_from_slice(raw_trailer.as_bytes());
            bytes
        }
    }

    fn make_validator(
        verifier: &mut FixedVerifier,
        counter_value: u16,
    ) -> Validator<&mut FixedVerifier, RamCounter> {
        let mut counter = MonotonicCounter::new(RamCounter::new());
        counter.set(counter_value, Slot::Zero).unwrap();
        Validator::new(verifier, counter, Config::new(SIZE, SIZE))
    }

    #[test]
    fn accepts_well_formed_image() {
        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert!(validator.validate_local(&image, &info));
        assert_eq!(fv.calls, 1);
        assert_eq!(fv.last_external, Some(false));
    }

    #[test]
    fn validation_does_not_bump_counter() {
        // Ratcheting the counter forward is the caller's decision, made
        // after it commits to booting the accepted image.
        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert!(validator.validate_local(&image, &info));
        assert_eq!(validator.counter().get().unwrap().0, 2);
    }

    #[test]
    fn accepts_trailer_after_padding() {
        let bytes = TestImage {
            trailer_pad: 4,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert!(validator.validate_local(&image, &info));
    }

    #[test]
    fn rejects_trailer_past_search_window() {
        let bytes = TestImage {
            trailer_pad: DEFAULT_SEARCH_DISTANCE + 1,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert!(!validator.validate_local(&image, &info));
        assert_eq!(fv.calls, 0);
    }

    #[test]
    fn rejects_stale_version() {
        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        // Counter is ahead of the image's version 3; signature validity
        // (the verifier's verdict) must not even be consulted.
        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 5);
        let info = validator.find_info(&image).unwrap();
        assert!(!validator.validate_local(&image, &info));
        assert_eq!(fv.calls, 0);
    }

    #[test]
    fn accepts_version_equal_to_counter() {
        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 3);
        let info = validator.find_info(&image).unwrap();
        assert!(validator.validate_local(&image, &info));
    }

    #[test]
    fn rejects_version_beyond_counter_range() {
        let bytes = TestImage {
            version: u32::from(storage::MAX_VERSION) + 1,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 0);
        let info = validator.find_info(&image).unwrap();
        assert!(!validator.validate_local(&image, &info));
    }

    #[test]
    fn disabled_counter_always_permits() {
        let bytes = TestImage {
            version: 0,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = Validator::new(
            &mut fv,
            MonotonicCounter::<RamCounter>::disabled(),
            Config::new(SIZE, SIZE),
        );
        let info = validator.find_info(&image).unwrap();
        assert!(validator.validate_local(&image, &info));
    }

    #[test]
    fn unreadable_counter_fails_closed() {
        struct BrokenCounter;
        impl CounterStorage for BrokenCounter {
            fn read(&self) -> Result<u16, storage::Error> {
                Err(storage::Error::Io)
            }
            fn write(&mut self, _: u16) -> Result<(), storage::Error> {
                Err(storage::Error::Io)
            }
        }

        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = Validator::new(
            &mut fv,
            MonotonicCounter::new(BrokenCounter),
            Config::new(SIZE, SIZE),
        );
        let info = validator.find_info(&image).unwrap();
        assert!(!validator.validate_local(&image, &info));
    }

    #[test]
    fn rejects_wrong_destination() {
        let bytes = TestImage::default().build();
        // The image claims 0x8000 but is presented as destined for 0x9000.
        let image = Image::new(0x9000, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert!(!validator.validate(0x9000, &image));
        assert!(!validator.validate_local(&image, &info));
    }

    #[test]
    fn local_requires_source_equals_destination() {
        let bytes = TestImage::default().build();
        // Staged at 0x20000, claiming (and destined for) 0x8000.
        let image = Image::new(0x20000, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = FwInfo::find(&image, 0).unwrap();
        assert_eq!(
            validator.run(DST, &image, &info, false),
            Err(Error::SourceMismatch)
        );
    }

    #[test]
    fn external_relaxes_source_only() {
        let bytes = TestImage::default().build();
        let image = Image::new(0x20000, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        assert!(validator.validate(DST, &image));
        assert_eq!(fv.last_external, Some(true));

        // The destination checks still bind: a wrong destination fails.
        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        assert!(!validator.validate(0x9000, &image));
    }

    #[test]
    fn rejects_invalidated_image() {
        let bytes = TestImage {
            valid: 0,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert!(!validator.validate_local(&image, &info));
    }

    #[test]
    fn rejects_total_size_smaller_than_size() {
        let bytes = TestImage {
            total_size: SIZE - 1,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert!(!validator.validate_local(&image, &info));
    }

    #[test]
    fn rejects_signed_region_not_covering_image() {
        // total_size == size passes the size check but leaves the image end
        // outside the (half-open) signed region.
        let bytes = TestImage {
            total_size: SIZE,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert_eq!(
            validator.run(DST, &image, &info, false),
            Err(Error::SignedRegion)
        );
    }

    #[test]
    fn rejects_size_exceeding_a_slot() {
        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        // Fits slot 0 but not slot 1; images must stay updatable via both.
        let mut fv = FixedVerifier::ok();
        let mut validator = Validator::new(
            &mut fv,
            MonotonicCounter::new(RamCounter::new()),
            Config::new(SIZE, SIZE - 1),
        );
        let info = validator.find_info(&image).unwrap();
        assert!(!validator.validate_local(&image, &info));
    }

    #[test]
    fn rejects_boot_address_outside_image() {
        let bytes = TestImage {
            boot_address: DST + SIZE,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert_eq!(
            validator.run(DST, &image, &info, false),
            Err(Error::BootAddress)
        );
    }

    #[test]
    fn rejects_reset_vector_outside_image() {
        // The boot address itself squeaks in, but the word after it falls
        // past the firmware body; whatever it decodes to there does not
        // point back into the region.
        let bytes = TestImage {
            boot_address: DST + SIZE - 1,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert_eq!(
            validator.run(DST, &image, &info, false),
            Err(Error::ResetVector)
        );
    }

    #[test]
    fn rejects_reset_handler_pointing_outside_image() {
        // A well-placed entry thunk whose reset-handler word points at
        // address 0, far outside the executable region.
        let bytes = TestImage {
            boot_address: DST + 0x800,
            reset_vector: 0,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert_eq!(
            validator.run(DST, &image, &info, false),
            Err(Error::ResetVector)
        );
        assert!(!validator.validate_local(&image, &info));
    }

    #[test]
    fn rejects_foreign_trailer() {
        let bytes = TestImage {
            trailer_address: 0x9000,
            ..Default::default()
        }
        .build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert_eq!(
            validator.run(DST, &image, &info, false),
            Err(Error::TrailerMismatch)
        );
    }

    #[test]
    fn rejects_missing_metadata() {
        let mut bytes = TestImage::default().build();
        bytes[0] ^= 0xff;
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        assert!(validator.find_info(&image).is_none());
        assert!(!validator.validate(DST, &image));
    }

    #[test]
    fn rejects_forged_metadata_copy() {
        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        // Metadata copied out of some other image: right magic, different
        // claims. Both the address gate and the self-consistency gate hold.
        let forged = FwInfo {
            size: SIZE,
            total_size: SIZE + 0x10,
            version: 0x7000,
            address: DST,
            boot_address: DST + 4,
            valid: info::VALID_VALUE,
        };
        assert_eq!(
            validator.run(DST, &image, &forged, false),
            Err(Error::InfoMismatch)
        );
    }

    #[test]
    fn verifier_verdict_is_final() {
        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::failing();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert!(!validator.validate_local(&image, &info));
        assert_eq!(fv.calls, 1);
    }

    #[test]
    fn verdict_is_idempotent() {
        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut fv = FixedVerifier::ok();
        let mut validator = make_validator(&mut fv, 2);
        let info = validator.find_info(&image).unwrap();
        assert!(validator.validate_local(&image, &info));
        assert!(validator.validate_local(&image, &info));

        let mut fv = FixedVerifier::failing();
        let mut validator = make_validator(&mut fv, 2);
        assert!(!validator.validate_local(&image, &info));
        assert!(!validator.validate_local(&image, &info));
    }

    #[test]
    fn key_rotation_through_full_pipeline() {
        const KEY_OLD: [u8; 32] = [0x11; 32];
        const KEY_NEW: [u8; 32] = [0x22; 32];

        let bytes = TestImage::default().build();
        let image = Image::new(DST, &bytes).unwrap();

        let mut keys = RamKeyStore::<4>::new();
        keys.provision(KEY_OLD).unwrap();
        keys.provision(KEY_NEW).unwrap();

        // First image verifies under the newer key; the older one is
        // revoked as a side effect.
        {
            let verifier = SignatureVerifier::new(
                fake::Rot::accepting(KEY_NEW),
                &mut keys,
            );
            let mut validator = Validator::new(
                verifier,
                MonotonicCounter::new(RamCounter::new()),
                Config::new(SIZE, SIZE),
            );
            let info = validator.find_info(&image).unwrap();
            assert!(validator.validate_local(&image, &info));
        }
        assert!(keys.is_invalidated(0));
        assert!(!keys.is_invalidated(1));

        // A second image signed only under the old key now fails.
        {
            let verifier = SignatureVerifier::new(
                fake::Rot::accepting(KEY_OLD),
                &mut keys,
            );
            let mut validator = Validator::new(
                verifier,
                MonotonicCounter::new(RamCounter::new()),
                Config::new(SIZE, SIZE),
            );
            let info = validator.find_info(&image).unwrap();
            assert!(!validator.validate_local(&image, &info));
        }
    }
}
