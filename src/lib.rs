//! Cycle-stepped DMG Game Boy emulation core.
//!
//! The crate contains the platform-agnostic machine (CPU/MMU/PPU/timer/DMA).
//! The desktop frontend in `main.rs` drives it through the [`gameboy`] facade,
//! one [`gameboy::GameBoy::step`] at a time.

/// ROM and boot image loading.
pub mod cartridge;

/// Startup configuration and per-subsystem trace toggles.
pub mod config;

/// SM83 (LR35902) CPU core.
pub mod cpu;

/// Development-time anomaly detection.
pub mod diagnostics;

/// OAM DMA unit.
pub mod dma;

/// Load-time error types.
pub mod error;

/// High-level facade that wires the CPU and MMU into a single machine.
pub mod gameboy;

/// Bus access gating policies.
pub mod hardware;

/// Joypad input register and edge-triggered interrupt behavior.
pub mod input;

/// Interrupt kinds, vectors and priority.
pub mod interrupt;

/// Memory map and hardware plumbing.
pub mod mmu;

/// Pixel Processing Unit (PPU) emulation.
pub mod ppu;

/// Serial output hook.
pub mod serial;

/// Divider/timer unit.
pub mod timer;
