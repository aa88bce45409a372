/// Boot sector, volume geometry parameters
/// [`reserved-sectors`][link] sectors including the boot sector itself
///
/// [link]: boot::BootSector
pub(crate) mod boot;

/// FAT region, [`number-of-fats`][link] copies of [`sectors-per-fat`][link] sectors,
/// only the first copy is used
///
/// [link]: boot::BootSector
pub(crate) mod fat;

/// Root directory region followed by the data region
pub(crate) mod data;
