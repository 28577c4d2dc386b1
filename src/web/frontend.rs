//! Embedded HTML/CSS/JS frontend for the salesdash web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! All numbers arrive pre-formatted from `/api/report`; the page only lays
//! them out and draws the charts.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>E-Commerce Sales Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --accent-soft: rgba(88,166,255,0.35);
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app {
  max-width: 1200px;
  margin: 0 auto;
  padding: 24px;
}

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
  gap: 16px;
  flex-wrap: wrap;
}

header h1 { font-size: 22px; font-weight: 600; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.controls { display: flex; gap: 8px; align-items: center; }
.controls label { color: var(--text-muted); font-size: 12px; }
select {
  background: var(--surface);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 6px 10px;
  font-size: 13px;
}

/* KPI cards */
.kpi-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
  gap: 16px;
  margin-bottom: 24px;
}

.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
}

.stat-card .label {
  font-size: 12px;
  color: var(--text-muted);
  text-transform: uppercase;
  letter-spacing: 0.5px;
}

.stat-card .value {
  font-size: 30px;
  font-weight: 700;
  font-family: var(--mono);
  line-height: 1.2;
  margin-top: 6px;
}

.stat-card .trend { font-size: 13px; font-family: var(--mono); margin-top: 4px; }
.trend.good { color: var(--green); }
.trend.bad { color: var(--red); }
.trend.none { color: var(--text-muted); }
.stars { color: var(--yellow); font-size: 18px; letter-spacing: 2px; }

/* Chart cards */
.grid-2 {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(460px, 1fr));
  gap: 16px;
  margin-bottom: 16px;
}

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
}

.card h2 {
  font-size: 15px;
  font-weight: 600;
  margin-bottom: 12px;
}

.legend { display: flex; gap: 16px; font-size: 12px; color: var(--text-muted); margin-bottom: 8px; }
.legend span::before {
  content: '';
  display: inline-block;
  width: 10px;
  height: 10px;
  border-radius: 3px;
  margin-right: 4px;
  vertical-align: middle;
}
.legend .cur::before { background: var(--accent); }
.legend .prev::before { background: var(--accent-soft); }

svg text { fill: var(--text-muted); font-size: 11px; font-family: var(--font); }
svg .grid { stroke: var(--border); stroke-width: 1; }

/* Horizontal bars */
.hbar { display: flex; align-items: center; gap: 8px; margin-bottom: 6px; font-size: 12px; }
.hbar .name { width: 160px; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; color: var(--text-muted); }
.hbar .track { flex: 1; background: rgba(255,255,255,0.04); border-radius: 3px; height: 16px; }
.hbar .fill { background: var(--accent); height: 100%; border-radius: 3px; transition: width 0.4s; }
.hbar .amount { width: 64px; text-align: right; font-family: var(--mono); }
.axis { display: flex; justify-content: space-between; margin-left: 168px; margin-right: 72px; color: var(--text-muted); font-size: 11px; }

table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { text-align: left; padding: 6px 10px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; font-size: 12px; text-transform: uppercase; }
td.num, th.num { text-align: right; font-family: var(--mono); }
.state-list { max-height: 320px; overflow-y: auto; }

.empty { color: var(--text-muted); text-align: center; padding: 32px 0; }
.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 10px 16px;
  opacity: 0;
  transition: opacity 0.2s;
}
.toast.show { opacity: 1; }
.toast.error { border-color: var(--red); color: var(--red); }
</style>
</head>
<body>
<div class="app">
  <header>
    <div>
      <h1>E-Commerce Sales Performance</h1>
      <div class="subtitle" id="subtitle">Loading…</div>
    </div>
    <div class="controls">
      <label for="year">Year</label>
      <select id="year"></select>
      <label for="month">Month</label>
      <select id="month"></select>
    </div>
  </header>

  <div class="kpi-grid">
    <div class="stat-card"><div class="label">Total Revenue</div><div class="value" id="kpi-revenue">—</div><div class="trend none" id="kpi-revenue-trend"></div></div>
    <div class="stat-card"><div class="label">Avg Monthly Growth</div><div class="value" id="kpi-growth">—</div><div class="trend none" id="kpi-growth-trend"></div></div>
    <div class="stat-card"><div class="label">Avg Order Value</div><div class="value" id="kpi-aov">—</div><div class="trend none" id="kpi-aov-trend"></div></div>
    <div class="stat-card"><div class="label">Total Orders</div><div class="value" id="kpi-orders">—</div><div class="trend none" id="kpi-orders-trend"></div></div>
  </div>

  <div class="grid-2">
    <div class="card">
      <h2>Revenue Trend</h2>
      <div class="legend" id="trend-legend"></div>
      <div id="trend-chart"></div>
    </div>
    <div class="card">
      <h2 id="cat-title">Top Categories</h2>
      <div id="cat-chart"></div>
    </div>
  </div>

  <div class="grid-2">
    <div class="card">
      <h2>Revenue by State</h2>
      <div class="state-list" id="state-list"></div>
    </div>
    <div class="card">
      <h2>Review Score vs Delivery Time</h2>
      <div id="sat-chart"></div>
    </div>
  </div>

  <div class="kpi-grid">
    <div class="stat-card"><div class="label">Average Delivery Time</div><div class="value" id="kpi-delivery">—</div><div class="trend none" id="kpi-delivery-trend"></div></div>
    <div class="stat-card"><div class="label">Average Review Score</div><div class="value" id="kpi-review">—</div><div class="stars" id="kpi-stars"></div></div>
  </div>
</div>
<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(path) {
  const res = await fetch(path);
  const data = await res.json();
  if (!res.ok) throw new Error((data && data.error) || res.statusText);
  return data;
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function esc(s) {
  if (s === undefined || s === null) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------
async function loadYears() {
  const y = await api('/api/years');
  const yearSel = document.getElementById('year');
  const monthSel = document.getElementById('month');
  yearSel.innerHTML = y.years.map(v =>
    `<option value="${v}"${v === y.default_year ? ' selected' : ''}>${v}</option>`).join('');
  monthSel.innerHTML = y.months.map(m => `<option value="${esc(m)}">${esc(m)}</option>`).join('');
  yearSel.addEventListener('change', loadReport);
  monthSel.addEventListener('change', loadReport);
}

async function loadReport() {
  const year = document.getElementById('year').value;
  const month = document.getElementById('month').value;
  const q = new URLSearchParams();
  if (year) q.set('year', year);
  if (month) q.set('month', month);
  try {
    const report = await api('/api/report?' + q.toString());
    if (!report) {
      document.getElementById('subtitle').textContent = 'No delivered orders in this dataset.';
      return;
    }
    render(report);
  } catch (e) {
    toast('Failed to load report: ' + e.message, true);
  }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------
function trendClass(t) {
  if (!t || t.kind === 'no_data') return 'none';
  return t.favorable ? 'good' : 'bad';
}

function setKpi(id, kpi) {
  document.getElementById(id).textContent = kpi.display;
  const el = document.getElementById(id + '-trend');
  el.textContent = kpi.trend_display;
  el.className = 'trend ' + trendClass(kpi.trend);
}

function render(r) {
  document.getElementById('subtitle').textContent = r.has_comparison
    ? `${r.period_label} compared with ${r.comparison_label}`
    : `${r.period_label} (no data for ${r.comparison_label})`;

  setKpi('kpi-revenue', r.kpis.total_revenue);
  setKpi('kpi-aov', r.kpis.avg_order_value);
  setKpi('kpi-orders', r.kpis.total_orders);
  setKpi('kpi-delivery', r.avg_delivery);

  const g = r.kpis.avg_monthly_growth;
  document.getElementById('kpi-growth').textContent = g.display;
  const gt = document.getElementById('kpi-growth-trend');
  gt.textContent = g.direction === 'up' ? '↑' : '↓';
  gt.className = 'trend ' + (g.favorable ? 'good' : 'bad');

  document.getElementById('kpi-review').textContent = r.avg_review.display;
  document.getElementById('kpi-stars').textContent = r.avg_review.stars;

  renderTrend(r.revenue_trend);
  renderCategories(r.top_categories);
  renderStates(r.state_revenue);
  renderSatisfaction(r.satisfaction);
}

const MONTHS = ['Jan','Feb','Mar','Apr','May','Jun','Jul','Aug','Sep','Oct','Nov','Dec'];

function renderTrend(t) {
  const el = document.getElementById('trend-chart');
  document.getElementById('trend-legend').innerHTML =
    `<span class="cur">${esc(t.current.name)}</span>` +
    (t.comparison.points.length ? `<span class="prev">${esc(t.comparison.name)}</span>` : '');
  if (t.current.points.length === 0 && t.comparison.points.length === 0) {
    el.innerHTML = '<div class="empty">No revenue in this period.</div>';
    return;
  }

  const W = 520, H = 240, L = 56, R = 12, T = 10, B = 24;
  const top = t.ticks.values[t.ticks.values.length - 1] || 1;
  const x = m => L + (MONTHS.indexOf(m) / 11) * (W - L - R);
  const y = v => T + (1 - v / top) * (H - T - B);

  let svg = `<svg viewBox="0 0 ${W} ${H}" width="100%">`;
  t.ticks.values.forEach((v, i) => {
    svg += `<line class="grid" x1="${L}" x2="${W - R}" y1="${y(v)}" y2="${y(v)}"/>`;
    svg += `<text x="${L - 6}" y="${y(v) + 4}" text-anchor="end">${esc(t.ticks.labels[i])}</text>`;
  });
  MONTHS.forEach(m => {
    svg += `<text x="${x(m)}" y="${H - 6}" text-anchor="middle">${m}</text>`;
  });
  const line = (pts, color, dash) => {
    if (!pts.length) return '';
    const d = pts.map((p, i) => `${i ? 'L' : 'M'}${x(p.label)},${y(p.value)}`).join(' ');
    let out = `<path d="${d}" fill="none" stroke="${color}" stroke-width="2"${dash ? ' stroke-dasharray="5 4"' : ''}/>`;
    pts.forEach(p => {
      out += `<circle cx="${x(p.label)}" cy="${y(p.value)}" r="3" fill="${color}"><title>${esc(p.label)}: ${esc(p.display)}</title></circle>`;
    });
    return out;
  };
  svg += line(t.comparison.points, 'var(--accent-soft)', true);
  svg += line(t.current.points, 'var(--accent)', false);
  svg += '</svg>';
  el.innerHTML = svg;
}

function renderCategories(c) {
  const el = document.getElementById('cat-chart');
  document.getElementById('cat-title').textContent = `Top ${c.bars.length || ''} Categories`;
  if (c.bars.length === 0) {
    el.innerHTML = '<div class="empty">No categorised sales.</div>';
    return;
  }
  const top = c.ticks.values[c.ticks.values.length - 1] || 1;
  el.innerHTML = c.bars.map(b => `
    <div class="hbar">
      <div class="name" title="${esc(b.label)}">${esc(b.label)}</div>
      <div class="track"><div class="fill" style="width:${(b.value / top) * 100}%"></div></div>
      <div class="amount">${esc(b.display)}</div>
    </div>`).join('') +
    `<div class="axis">${c.ticks.labels.map(l => `<span>${esc(l)}</span>`).join('')}</div>`;
}

function renderStates(states) {
  const el = document.getElementById('state-list');
  if (states.length === 0) {
    el.innerHTML = '<div class="empty">No state data.</div>';
    return;
  }
  el.innerHTML = `<table><thead><tr><th>#</th><th>State</th><th class="num">Revenue</th></tr></thead><tbody>` +
    states.map((s, i) => `<tr><td>${i + 1}</td><td>${esc(s.label)}</td><td class="num">${esc(s.display)}</td></tr>`).join('') +
    '</tbody></table>';
}

function renderSatisfaction(bars) {
  const el = document.getElementById('sat-chart');
  el.innerHTML = bars.map(b => `
    <div class="hbar">
      <div class="name">${esc(b.bucket)}</div>
      <div class="track"><div class="fill" style="width:${((b.mean_score || 0) / 5) * 100}%"></div></div>
      <div class="amount">${esc(b.display)}</div>
    </div>`).join('') +
    `<div class="axis">${[0,1,2,3,4,5].map(v => `<span>${v}</span>`).join('')}</div>`;
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
loadYears().then(loadReport).catch(e => toast('Failed to load years: ' + e.message, true));
</script>
</body>
</html>"##;
